#![allow(dead_code)]

use message_html::html::SafeHtml;
use message_html::model::{
    FlagsState, MessageRenderData, Reaction, ReactionType, ReactionUser, RenderContext,
};

/// Captures tracing output for tests.
pub struct TestTracing {
    buffer: std::sync::Arc<std::sync::Mutex<Vec<u8>>>,
}

impl TestTracing {
    pub fn new() -> Self {
        Self {
            buffer: std::sync::Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.buffer.clone();
        let make_writer = move || TestWriter(writer.clone());
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::TRACE)
            .with_writer(make_writer)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn output(&self) -> String {
        let buf = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Assert that the captured log output contains the provided substring.
    pub fn assert_contains(&self, needle: &str) {
        let out = self.output();
        assert!(
            out.contains(needle),
            "expected logs to contain `{needle}`, got:\n{out}"
        );
    }
}

struct TestWriter(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for TestWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut guard = self.0.lock().unwrap();
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub fn context() -> RenderContext {
    RenderContext {
        own_email: "me@example.com".to_string(),
        ..Default::default()
    }
}

pub fn context_with_flags(flags: FlagsState) -> RenderContext {
    RenderContext {
        flags,
        ..context()
    }
}

pub fn message(id: u64, is_brief: bool) -> MessageRenderData {
    MessageRenderData {
        content: SafeHtml::trusted("<p>hi</p>"),
        id,
        is_outbox: false,
        reactions: Vec::new(),
        time_edited: None,
        from_name: "Ada Lovelace".to_string(),
        from_email: "ada@example.com".to_string(),
        timestamp: 1_500_000_000,
        avatar_url: "https://example.com/ada.png".to_string(),
        is_brief,
    }
}

pub fn unicode_reaction(name: &str, code: &str, email: &str) -> Reaction {
    Reaction {
        emoji_name: name.to_string(),
        emoji_code: code.to_string(),
        reaction_type: ReactionType::UnicodeEmoji,
        user: ReactionUser {
            email: email.to_string(),
            full_name: String::new(),
            user_id: 0,
        },
    }
}

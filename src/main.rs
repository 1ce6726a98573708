fn main() -> anyhow::Result<()> {
    message_html::logging::init();
    message_html::run()
}

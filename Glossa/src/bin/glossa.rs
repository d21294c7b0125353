fn main() -> anyhow::Result<()> {
    glossa::cli::run_cli()
}

fn main() -> anyhow::Result<()> {
    brrtdispatch::cli::run_cli()
}

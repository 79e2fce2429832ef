fn main() -> anyhow::Result<()> {
    cfn_propgen::init();
    cfn_propgen::cli::run()
}

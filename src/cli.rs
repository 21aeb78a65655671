use clap::Subcommand;

mod analyze;
mod llm;
mod serve;

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the valuation pipeline for a ticker")]
    #[clap(visible_aliases = &["run"])]
    Analyze(Box<analyze::AnalyzeCommand>),

    #[command(subcommand, about = "Configure or test the LLM provider")]
    Llm(llm::LlmCommand),

    #[command(about = "Serve the web UI")]
    Serve(Box<serve::ServeCommand>),
}

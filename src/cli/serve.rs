use std::path::PathBuf;

use colored::Colorize;
use stkval::api;

#[derive(clap::Args)]
pub struct ServeCommand {
    #[arg(
        short = 'o',
        long = "out",
        help = "Directory to write valuation sheets, the default is the app data dir"
    )]
    out: Option<PathBuf>,

    #[arg(
        short = 'p',
        long = "port",
        help = "Port to listen on, the default value is 3030"
    )]
    port: Option<u16>,
}

impl ServeCommand {
    pub async fn exec(&self) {
        let options = api::AnalyzeOptions {
            output_dir: self.out.clone(),
        };

        if let Err(err) = api::serve(self.port.unwrap_or(3030), options).await {
            println!("{}", err.to_string().red());
        }
    }
}

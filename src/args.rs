use clap::{Parser, ValueEnum};
use product_page::PageSource;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "product-page")]
#[command(about = "Extracts structured product data from Amazon product pages")]
#[command(version)]
pub struct Args {
    /// Product page to extract (web URL, or HTML file path with --source file)
    pub uri: String,

    /// Where the page comes from
    #[arg(short, long, value_enum, default_value_t = SourceArg::Web)]
    pub source: SourceArg,

    /// URL the saved page was served from (file sources only)
    #[arg(long)]
    pub url: Option<String>,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Don't fetch images as base64 data URIs
    #[arg(long)]
    pub no_images: bool,

    /// Amazon Associates tag for the affiliate link
    #[arg(long)]
    pub associate_id: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    Web,
    File,
}

/// Convert from CLI arguments to a page source
pub fn page_source(args: &Args) -> PageSource {
    match args.source {
        SourceArg::Web => PageSource::Web(args.uri.clone()),
        SourceArg::File => PageSource::File {
            path: PathBuf::from(&args.uri),
            // Saved pages without a known URL still need a base for relative links
            url: args
                .url
                .clone()
                .unwrap_or_else(|| "https://www.amazon.com/".to_string()),
        },
    }
}

use clap::Parser;
use product_page::{PageSource, ProductPage};
use std::process::ExitCode;

mod args;
use args::{Args, page_source};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();
    ::log::info!("Extracting product page: {}", args.uri);

    let source = page_source(&args);
    if let PageSource::Web(_) = &source {
        ::log::info!(
            "Live pages require a WebDriver server; set WEBDRIVER_URL if not using http://localhost:4444"
        );
    }

    let mut page = ProductPage::new(source);
    if let Some(path) = &args.config {
        page = match page.with_config_file(path) {
            Ok(page) => page,
            Err(e) => {
                ::log::error!("Failed to load config {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        };
    }
    if args.no_images {
        page = page.without_images();
    }
    if let Some(associate_id) = &args.associate_id {
        page = page.with_associate_id(associate_id);
    }

    let record = match page.extract().await {
        Ok(record) => record,
        Err(e) => {
            ::log::error!("Failed to load product page: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&record)
    } else {
        serde_json::to_string(&record)
    };
    match json {
        Ok(json) => println!("{}", json),
        Err(e) => {
            ::log::error!("Failed to serialize record: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if record.meta.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

use clap::Parser;
use std::error::Error;
use update_scan::config::MonitorConfig;
use update_scan::fetchers::web::WebDriverFetcher;
use update_scan::scheduler::Scheduler;
use update_scan::store::{self, PageCollection};
use update_scan::{Notification, ScanStatus, Watcher};

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        ::log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => MonitorConfig::from_file(path)?,
        None => MonitorConfig::default(),
    }
    .with_env_overrides();

    // Apply command-line overrides
    if let Some(store_path) = args.store {
        config.store_path = store_path;
    }
    if let Some(concurrency) = args.concurrency {
        config.max_concurrency = concurrency;
    }
    if let Some(interval) = args.interval {
        config.tick_interval_secs = interval;
    }

    let mut collection = store::load(&config.store_path)?;
    let pages = collection
        .pages()
        .into_iter()
        .cloned()
        .collect::<Vec<_>>();
    ::log::info!(
        "Loaded {} pages from {}",
        pages.len(),
        config.store_path
    );

    println!("Note: scanning requires a WebDriver server (e.g., ChromeDriver).");
    println!(
        "Set WEBDRIVER_URL environment variable if not using {}",
        config.webdriver_url
    );

    let fetcher = WebDriverFetcher::from_config(&config);
    let store_path = config.store_path.clone();
    let watcher = Watcher::new().with_config(config);

    if args.once {
        let (scheduler, mut notifications) = watcher.build(fetcher, pages).await;
        let start_time = std::time::Instant::now();
        for handle in scheduler.scan_all().await {
            handle.await?;
        }
        while let Ok(notification) = notifications.try_recv() {
            report(&notification);
        }
        save(&scheduler, &mut collection, &store_path).await?;
        scheduler.fetcher().close().await;
        print_summary(&collection);
        ::log::info!(
            "Scan complete in {:.2} seconds",
            start_time.elapsed().as_secs_f64()
        );
        return Ok(());
    }

    let mut handle = watcher.start(fetcher, pages).await;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                ::log::info!("Interrupted, saving and exiting");
                break;
            }

            notification = handle.notifications.recv() => {
                let Some(notification) = notification else { break };
                report(&notification);
                save(&handle.scheduler, &mut collection, &store_path).await?;
            }
        }
    }

    let scheduler = handle.shutdown().await;
    save(&scheduler, &mut collection, &store_path).await?;
    scheduler.fetcher().close().await;
    Ok(())
}

/// Write the scheduler's page state back to the store
async fn save(
    scheduler: &Scheduler<WebDriverFetcher>,
    collection: &mut PageCollection,
    path: &str,
) -> Result<(), Box<dyn Error>> {
    collection.merge(scheduler.pages().await);
    store::save(path, collection)?;
    Ok(())
}

fn report(notification: &Notification) {
    match notification {
        Notification::Changed { url, title, diff } => {
            ::log::info!("Changed: {} ({} characters)", url, diff.magnitude);
            println!("CHANGED  {} <{}>", title, url);
            for fragment in diff.changes().take(5) {
                println!("    {:?}: {}", fragment.tag, fragment.text.trim());
            }
        }
        Notification::Error { url, title, reason } => {
            ::log::warn!("Error: {}: {}", url, reason);
            println!("ERROR    {} <{}>: {}", title, url, reason);
        }
    }
}

fn print_summary(collection: &PageCollection) {
    let pages = collection.pages();
    let count = |status: ScanStatus| pages.iter().filter(|p| p.status == status).count();
    println!(
        "{} pages: {} changed, {} unchanged, {} errors",
        pages.len(),
        count(ScanStatus::Changed),
        count(ScanStatus::NoChange),
        count(ScanStatus::Error)
    );
}

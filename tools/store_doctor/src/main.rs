use evidence_core::records::store::RecordStore;
use evidence_core::storage::config::StoreConfig;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 2 {
        eprintln!("usage: store_doctor [path/to/store_config.json | path/to/store_root]");
        std::process::exit(2);
    }

    let cfg = match args.get(1).map(Path::new) {
        None => StoreConfig::default(),
        Some(p) if p.is_dir() => StoreConfig::rooted(p),
        Some(p) => match StoreConfig::load(p) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("config error: {}", e);
                std::process::exit(2);
            }
        },
    };

    let store = match RecordStore::attach(cfg) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("store error: {}", e);
            std::process::exit(2);
        }
    };

    match store.audit() {
        Ok(report) => {
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("report error: {}", e);
                    std::process::exit(1);
                }
            }
            if report.is_clean() {
                std::process::exit(0);
            } else {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("audit error: {}", e);
            std::process::exit(1);
        }
    }
}

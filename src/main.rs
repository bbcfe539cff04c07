use gabai_width::batch::{
    load_knot_list, parse_knot_list, run_batch, save_reports, write_reports, BatchSummary, KnotEntry,
};
use gabai_width::search::SearchConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "gabai_width=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut cfg = SearchConfig::default();
    let mut validate_only = false;
    let mut codes: Vec<String> = Vec::new();
    let mut files: Vec<String> = Vec::new();
    let mut output: Option<String> = None;

    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--test" | "--validate" => {
                validate_only = true;
                i += 1;
            }
            "--code" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                codes.push(v.clone());
                i += 2;
            }
            "--file" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                files.push(v.clone());
                i += 2;
            }
            "--output" | "-o" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                output = Some(v.clone());
                i += 2;
            }
            "--workers" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                cfg.workers = v.parse().unwrap_or_else(|_| usage_and_exit(2));
                i += 2;
            }
            "--help" | "-h" => usage_and_exit(0),
            _ => usage_and_exit(2),
        }
    }

    if validate_only {
        match gabai_width::validate::validate_reference_knots(&cfg) {
            Ok(()) => {
                println!("Validation OK: bundled reference diagrams have their recorded widths.");
                return;
            }
            Err(e) => {
                eprintln!("Validation FAILED: {e}");
                std::process::exit(1);
            }
        }
    }

    if codes.is_empty() && files.is_empty() {
        usage_and_exit(2);
    }

    let mut entries = Vec::new();
    for path in &files {
        match load_knot_list(path) {
            Ok(mut list) => entries.append(&mut list),
            Err(e) => {
                eprintln!("{path}: {e}");
                std::process::exit(1);
            }
        }
    }
    for (k, code) in codes.iter().enumerate() {
        if code.contains('|') {
            entries.append(&mut parse_knot_list(code));
        } else {
            entries.push(KnotEntry::new(format!("code-{}", k + 1), code.clone()));
        }
    }

    let reports = run_batch(&entries, &cfg);
    let written = match &output {
        Some(path) => save_reports(path, &reports),
        None => write_reports(std::io::stdout().lock(), &reports),
    };
    if let Err(e) = written {
        eprintln!("cannot write reports: {e}");
        std::process::exit(1);
    }

    let summary = BatchSummary::of(&reports);
    if summary.rejected > 0 || summary.mismatched > 0 {
        std::process::exit(1);
    }
}

fn usage_and_exit(code: i32) -> ! {
    eprintln!(
        "Usage:\n  gabai-width [--code CODE]... [--file PATH]... [--output PATH] [--workers N]\n  gabai-width --validate [--workers N]\n\nOptions:\n  --code CODE          Decide one Gauss code, e.g. \"1, -2, 3, -1, 2, -3\" (repeatable)\n  --file PATH          Decide every knot in a knot list (`name | code` per line, repeatable)\n  --output/-o PATH     Write reports to PATH instead of stdout\n  --workers N          Search threads; 1 searches sequentially (default: auto-detect)\n  --test/--validate    Check the bundled reference diagrams (deterministic)\n\nLogging is controlled by RUST_LOG (default: gabai_width=info).\n"
    );
    std::process::exit(code)
}

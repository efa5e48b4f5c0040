use leadconverter::cli::{exit_code, run};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let _ = enable_ansi_support::enable_ansi_support();

    if let Err(e) = run() {
        let code = exit_code(&e);
        if code == 1 {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("Internal error: {}", e);
            let mut source = e.source();
            if source.is_some() {
                eprintln!("\nCaused by:");
                let mut indent = 1;
                while let Some(err) = source {
                    eprintln!("{:indent$}  {}", "", err);
                    source = err.source();
                    indent += 1;
                }
            }
        }
        std::process::exit(code);
    }
}

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "debug";

pub fn setup_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter());

    tracing_subscriber::fmt()
        // .with_file(true)
        // .with_line_number(true)
        .with_target(true)
        .with_level(true)
        .with_ansi(true)
        .compact()
        .with_env_filter(filter)
        .init();
}

fn default_filter() -> EnvFilter {
    let mut filter = EnvFilter::new(DEFAULT_FILTER);
    for directive in ["hyper=warn", "reqwest=warn"] {
        if let Ok(d) = directive.parse() {
            filter = filter.add_directive(d);
        }
    }
    filter
}

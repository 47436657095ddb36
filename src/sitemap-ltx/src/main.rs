use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use sitemap_ltx::common::setup_logging;
use sitemap_ltx::{
    Generator, GeneratorOptions, GeneratorOptionsBuilder, LogUsageTracker, ProgressEvent, categorize_url,
    extract_page_data,
};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "sitemap-ltx")]
#[command(about = "Generate an llms.txt digest of a website from its sitemap", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an llms.txt from a sitemap URL
    Generate(GenerateArgs),

    /// Print the title and description extracted from a local HTML file
    Extract {
        #[arg(value_parser = validate_input_file)]
        file: PathBuf,
    },

    /// Print the section and priority assigned to each URL
    Categorize {
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// URL of the sitemap (or sitemap index) to process
    sitemap_url: String,
    /// Output file path for the generated llms.txt (default: stdout)
    #[arg(short, long, value_parser = validate_output_file)]
    output: Option<PathBuf>,
    /// Number of pages fetched at the same time [env: LTX_CONCURRENCY]
    #[arg(long)]
    concurrency: Option<usize>,
    /// Minimum section priority for a page to be listed [env: LTX_PRIORITY_THRESHOLD]
    #[arg(long)]
    priority_threshold: Option<f64>,
    /// Title of the document, instead of the one derived from the site
    #[arg(long)]
    title: Option<String>,
    /// Description of the document, instead of the one derived from the site
    #[arg(long)]
    description: Option<String>,
    /// Only process URLs containing this text (repeatable)
    #[arg(long)]
    include: Vec<String>,
    /// Skip URLs containing this text (repeatable, wins over --include)
    #[arg(long)]
    exclude: Vec<String>,
    /// Per-request timeout in milliseconds [env: LTX_REQUEST_TIMEOUT_MS]
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// User-Agent header for every request [env: LTX_USER_AGENT]
    #[arg(long)]
    user_agent: Option<String>,
    /// Rewrite page titles with a sed-style rule, e.g. 's/ - Acme$//' (repeatable)
    #[arg(long)]
    replace_title: Vec<String>,
    /// Stream progress, result and error events to stdout as newline-delimited JSON
    #[arg(long)]
    ndjson: bool,
}

impl GenerateArgs {
    /// Merges the command line flags over the environment defaults.
    fn options(&self) -> sitemap_ltx::Result<GeneratorOptions> {
        let mut builder = GeneratorOptionsBuilder::from_env()?;
        if let Some(concurrency) = self.concurrency {
            builder = builder.concurrency(concurrency);
        }
        if let Some(threshold) = self.priority_threshold {
            builder = builder.priority_threshold(threshold);
        }
        if let Some(title) = &self.title {
            builder = builder.title(title.clone());
        }
        if let Some(description) = &self.description {
            builder = builder.description(description.clone());
        }
        if let Some(timeout_ms) = self.timeout_ms {
            builder = builder.request_timeout_ms(timeout_ms);
        }
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        builder
            .include_paths(self.include.clone())
            .exclude_paths(self.exclude.clone())
            .replace_titles(self.replace_title.clone())
            .build()
    }
}

fn validate_input_file(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);

    if !path.exists() {
        return Err(format!("Input path does not exist: {}", path.display()));
    }

    if !path.is_file() {
        return Err(format!("Input path is not a file: {}", path.display()));
    }

    Ok(path)
}

fn validate_output_file(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);

    if path.exists() && path.is_dir() {
        return Err(format!("Output path is a directory: {}", path.display()));
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        return Err(format!(
            "Output file parent directory does not exist: {}",
            parent.display()
        ));
    }

    Ok(path)
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file., if it exists
    dotenvy::dotenv().ok();

    setup_logging("sitemap_ltx=info");

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => generate(args).await,
        Commands::Extract { file } => extract(&file),
        Commands::Categorize { urls } => {
            for url in &urls {
                let section = categorize_url(url);
                println!("{}\t{:.1}\t{}", section, section.priority(), url);
            }
            ExitCode::SUCCESS
        }
    }
}

async fn generate(args: GenerateArgs) -> ExitCode {
    let generator = match args.options().and_then(Generator::with_http) {
        Ok(generator) => generator.with_usage_tracker(Arc::new(LogUsageTracker)),
        Err(e) => {
            eprintln!("ERROR: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, cancelling generation");
                cancel.cancel();
            }
        }
    });

    let ndjson = args.ndjson;
    let result = generator
        .run(&args.sitemap_url, |event| report(&event, ndjson), &cancel)
        .await;

    match result {
        Ok(content) => {
            if let Some(output) = &args.output {
                if let Err(e) = std::fs::write(output, format!("{}\n", content)) {
                    eprintln!("ERROR: Cannot write file ({output:?}) due to: {e}");
                    return ExitCode::FAILURE;
                }
                tracing::info!("Wrote llms.txt to {}", output.display());
            } else if !ndjson {
                println!("{}", content);
            }
            ExitCode::SUCCESS
        }
        Err(e) if e.is_cancelled() => ExitCode::from(130),
        Err(e) => {
            if !ndjson {
                eprintln!("ERROR: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}

fn report(event: &ProgressEvent, ndjson: bool) {
    if ndjson {
        match event.to_ndjson() {
            Ok(line) => {
                let mut stdout = std::io::stdout().lock();
                if let Err(e) = stdout.write_all(line.as_bytes()).and_then(|_| stdout.flush()) {
                    tracing::error!("Cannot write event: {}", e);
                }
            }
            Err(e) => tracing::error!("Cannot serialize event: {}", e),
        }
    } else if let ProgressEvent::Progress {
        processed,
        total,
        message,
    } = event
    {
        eprintln!("[{}/{}] {}", processed, total, message);
    }
}

fn extract(file: &Path) -> ExitCode {
    match std::fs::read_to_string(file) {
        Ok(html) => {
            let page = extract_page_data(&html);
            println!("title: {}", page.title.as_deref().unwrap_or("-"));
            println!("description: {}", page.description.as_deref().unwrap_or("-"));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("ERROR: Cannot read file ({file:?}) due to: {e:?}");
            ExitCode::FAILURE
        }
    }
}

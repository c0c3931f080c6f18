use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use mathseg::{Answer, Config, MathmlRenderer};

#[derive(Parser)]
#[command(name = "mathseg", version)]
#[command(about = "Split math-solver answers into text and math segments")]
struct Cli {
    /// Input answer file (reads stdin when omitted or "-")
    input: Option<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// TOML config file (defaults to the bundled config)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the normalized answer and stop
    #[arg(long)]
    normalize_only: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Html,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let body = read_input(cli.input.as_ref())
        .map_err(|e| format!("reading {}: {}", input_name(cli.input.as_ref()), e))?;

    let rendered = if cli.normalize_only {
        let mut normalized = mathseg::normalize(&body);
        normalized.push('\n');
        normalized
    } else {
        let answer = mathseg::process_response(&body, &config);
        match cli.format {
            Format::Json => answer_to_json(&answer)?,
            Format::Html => answer_to_html(&answer, &config),
        }
    };

    match &cli.output {
        Some(path) => fs::write(path, rendered)
            .map_err(|e| format!("writing {}: {}", path.display(), e))?,
        None => print!("{}", rendered),
    }
    Ok(())
}

fn read_input(input: Option<&PathBuf>) -> io::Result<String> {
    match input {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path),
        _ => {
            let mut body = String::new();
            io::stdin().read_to_string(&mut body)?;
            Ok(body)
        }
    }
}

fn input_name(input: Option<&PathBuf>) -> String {
    match input {
        Some(path) if path.as_os_str() != "-" => path.display().to_string(),
        _ => "stdin".to_string(),
    }
}

fn answer_to_json(answer: &Answer) -> serde_json::Result<String> {
    let mut json = match answer {
        Answer::NotMath => serde_json::to_string_pretty(&serde_json::json!({ "type": "not_math" }))?,
        Answer::Solution(segments) => serde_json::to_string_pretty(segments)?,
    };
    json.push('\n');
    Ok(json)
}

fn answer_to_html(answer: &Answer, config: &Config) -> String {
    match answer {
        Answer::NotMath => format!("<p>{}</p>\n", mathseg::NOT_A_MATH_PROBLEM),
        Answer::Solution(segments) => {
            mathseg::segments_to_html(segments, &MathmlRenderer, &config.render)
        }
    }
}

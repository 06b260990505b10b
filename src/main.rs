use clap::{Parser as ClapParser, Subcommand};
use molang::cli::{self, CliError, EvalOptions};
use molang::output::JsonPrinter;
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "molang")]
#[command(about = "MoLang - evaluate animation and behavior formulas")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile and evaluate a MoLang formula
    Eval {
        /// The formula to evaluate
        expression: String,

        /// JSON object bound to the context root (reads from stdin if not provided)
        #[arg(short, long)]
        context: Option<String>,

        /// Number bound to `this`
        #[arg(long, allow_hyphen_values = true)]
        this: Option<f64>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax, don't evaluate
        #[arg(long)]
        syntax_only: bool,

        /// Skip constant folding
        #[arg(long)]
        no_fold: bool,

        /// Evaluate N times against the same environment
        #[arg(short = 'n', long, default_value_t = 1)]
        repeat: usize,

        /// Seed for math.random and friends
        #[arg(long)]
        seed: Option<u64>,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'molang docs' to list categories)
        category: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Eval {
            expression,
            context,
            this,
            pretty,
            syntax_only,
            no_fold,
            repeat,
            seed,
        } => {
            let options = EvalOptions {
                expression,
                context,
                this,
                syntax_only,
                no_fold,
                repeat,
                seed,
            };
            run_eval(options, pretty)
        }
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| print!("{}", content)),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_eval(mut options: EvalOptions, pretty: bool) -> Result<(), CliError> {
    if options.context.is_none() && !options.syntax_only && !atty::is(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        if !buffer.trim().is_empty() {
            options.context = Some(buffer);
        }
    }

    match cli::execute_eval(&options)?.into_value() {
        None => println!("Syntax is valid"),
        Some(value) => println!("{}", JsonPrinter::new(pretty).print(&value)),
    }
    Ok(())
}

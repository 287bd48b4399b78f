use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use passbook_core::{format_amount, Transaction};
use passbook_finance::{
    export_to_dir, search, summarize, top_expenses, top_incomes, ClassifiedTransaction,
    ExportFormat, SearchScope,
};
use passbook_ingest::SourceKind;
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod sources;
mod state;

#[derive(Parser, Debug)]
#[command(
    name = "passbook",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("PASSBOOK_BUILD_SHA"), ")"),
    about = "Rebuild bank-statement transactions from extracted text, tables or sheets"
)]
struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct Inputs {
    /// How the inputs were extracted: text, tables or sheets
    #[arg(long, default_value = "text")]
    kind: SourceKind,

    /// Extracted statement files (for sheets: workbooks, or one CSV per worksheet)
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconstruct transactions and export them
    Parse {
        #[command(flatten)]
        inputs: Inputs,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// csv, xlsx, json, ofx or all (repeatable; default from config)
        #[arg(short, long = "format")]
        formats: Vec<String>,

        /// Output file name without extension (default from config)
        #[arg(long)]
        base_name: Option<String>,
    },

    /// Income, expense, cost-head and customer summary
    Report {
        #[command(flatten)]
        inputs: Inputs,

        /// Number of largest incomes and expenses to list
        #[arg(long, default_value_t = 10)]
        top: usize,
    },

    /// Find transactions whose narration contains a keyword
    Search {
        #[command(flatten)]
        inputs: Inputs,

        #[arg(short, long)]
        keyword: String,

        /// Search deposits instead of expenses
        #[arg(long)]
        income: bool,
    },

    /// Manage ~/.passbook/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Parse {
            inputs,
            out_dir,
            formats,
            base_name,
        } => {
            let cfg = config::load_config()?;
            let txns = sources::load_transactions(inputs.kind, &inputs.files)?;
            let formats = resolve_formats(&formats, &cfg.export.formats)?;
            let base_name = base_name.unwrap_or_else(|| cfg.export.base_name.clone());
            let ofx = cfg.ofx_options(chrono::Local::now().naive_local());

            let written = export_to_dir(&txns, &out_dir, &base_name, &formats, &ofx)?;
            println!("Parsed {} transactions", txns.len());
            for path in written {
                println!("Wrote {}", path.display());
            }
        }

        Command::Report { inputs, top } => {
            let cfg = config::load_config()?;
            let txns = sources::load_transactions(inputs.kind, &inputs.files)?;
            let classifier = cfg.classifier();
            let classified = classifier.classify_all(&txns);
            print_report(
                &txns,
                &classified,
                &cfg,
                classifier.cost_heads(),
                top,
            );
        }

        Command::Search {
            inputs,
            keyword,
            income,
        } => {
            let cfg = config::load_config()?;
            let txns = sources::load_transactions(inputs.kind, &inputs.files)?;
            let classified = cfg.classifier().classify_all(&txns);
            let scope = if income {
                SearchScope::Income
            } else {
                SearchScope::Expense
            };
            let result = search(&classified, &keyword, scope);
            if result.matches.is_empty() {
                println!("Nothing found containing '{}'.", keyword.trim());
                return Ok(());
            }
            println!(
                "{} transaction(s) containing '{}', total {}",
                result.matches.len(),
                keyword.trim(),
                rupees(result.total)
            );
            for t in result.matches {
                print_line(t, scope);
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },
    }

    Ok(())
}

fn resolve_formats(requested: &[String], defaults: &[ExportFormat]) -> Result<Vec<ExportFormat>> {
    if requested.is_empty() {
        return Ok(defaults.to_vec());
    }
    let mut out: Vec<ExportFormat> = Vec::new();
    for name in requested {
        let batch = if name.eq_ignore_ascii_case("all") {
            ExportFormat::ALL.to_vec()
        } else {
            match name.parse::<ExportFormat>() {
                Ok(f) => vec![f],
                Err(e) => bail!(e),
            }
        };
        for f in batch {
            if !out.contains(&f) {
                out.push(f);
            }
        }
    }
    Ok(out)
}

fn rupees(amount: Decimal) -> String {
    format!("₹{}", format_amount(amount))
}

fn print_line(t: &ClassifiedTransaction, scope: SearchScope) {
    let amount = match scope {
        SearchScope::Income => t.record.deposit,
        SearchScope::Expense => t.record.withdrawal,
    };
    println!(
        "  {}  {:>14}  {}",
        t.record.date.format("%Y-%m-%d"),
        rupees(amount),
        t.record.narration
    );
}

fn print_report(
    txns: &[Transaction],
    classified: &[ClassifiedTransaction],
    cfg: &config::Config,
    cost_heads: &passbook_finance::CostHeadTable,
    top: usize,
) {
    let s = summarize(classified, cost_heads, cfg.classifier.repeat_threshold);

    println!("# Summary ({} transactions)\n", txns.len());
    println!("Total income (deposits):     {}", rupees(s.total_income));
    println!("Total expense (withdrawals): {}", rupees(s.total_expense));
    println!("Profit:                      {}", rupees(s.profit));
    println!("Margin:                      {:.1}%", s.margin_pct);
    println!(
        "Income transactions: {}   Expense transactions: {}",
        s.income_count, s.expense_count
    );
    println!(
        "Cash income: {}   Digital income: {}",
        rupees(s.cash_income),
        rupees(s.digital_income)
    );

    println!("\n## Monthly\n");
    for m in &s.monthly {
        println!("  {}  income {:>14}  expense {:>14}", m.month, rupees(m.income), rupees(m.expense));
    }

    println!("\n## Cost heads\n");
    for h in &s.cost_heads {
        println!("  {:<26} {:>4}  {:>14}", h.name, h.transactions, rupees(h.total));
    }

    println!("\n## Customers (UPI, NEFT, IMPS)\n");
    println!("Unique customers: {}", s.customers.unique);
    println!(
        "Repeat customers (more than {} transactions): {}",
        cfg.classifier.repeat_threshold, s.customers.repeat
    );
    println!("Repeat share: {:.1}%", s.customers.repeat_pct);
    for c in s.customers.totals.iter().take(top) {
        println!(
            "  {:<40} {:<5} {:>4}  {:>14}",
            c.counterparty.id,
            c.counterparty.rail.label(),
            c.transactions,
            rupees(c.total)
        );
    }

    println!("\n## Top {top} incomes\n");
    for t in top_incomes(classified, top) {
        print_line(t, SearchScope::Income);
    }
    println!("\n## Top {top} expenses\n");
    for t in top_expenses(classified, top) {
        print_line(t, SearchScope::Expense);
    }
}

use std::fs::File;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use hotel_ledger::config::load_config;
use hotel_ledger::core::{
    Currency, DateRange, ExpenseCategory, LedgerScreen, LoadState, NewCashSale, NewExpense,
    PaymentMethod, ProfitAndLossScreen, RevenueCategory, build_dashboard, fetch_sources,
    record_cash_sale, record_credit_payment, record_expense, refresh_overdue,
};
use hotel_ledger::export::{write_ledger_csv, write_pnl_csv};
use tracing::info;

#[derive(Parser)]
#[command(name = "hotel-ledger", about = "Hotel back-office ledger and reports")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Method {
    Cash,
    Deposit,
}

#[derive(Clone, Copy, ValueEnum)]
enum Report {
    Ledger,
    Pnl,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one page of the unified ledger
    Ledger {
        /// Date filter, e.g. `start:2024-01-01 end:2024-01-31` or `date:2024-01-01..`
        #[arg(long, default_value = "")]
        range: DateRange,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Show the profit-and-loss statement for one currency
    Pnl {
        /// Date filter, e.g. `start:2024-01-01 end:2024-01-31` or `date:2024-01-01..`
        #[arg(long, default_value = "")]
        range: DateRange,
        #[arg(long)]
        currency: Option<Currency>,
    },
    /// Show per-currency totals and recent activity
    Dashboard {
        #[arg(long)]
        as_of: Option<NaiveDate>,
        #[arg(long, default_value_t = 10)]
        recent: usize,
    },
    /// Record a cash sale; a shortfall becomes a credit sale
    CashSale {
        #[arg(long)]
        item: String,
        #[arg(long)]
        amount: f64,
        /// Amount actually paid, defaults to the full amount
        #[arg(long)]
        tendered: Option<f64>,
        #[arg(long)]
        currency: Option<Currency>,
        #[arg(long)]
        customer: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        due: Option<NaiveDate>,
    },
    /// Record a payment against a credit sale
    PayCredit {
        #[arg(long)]
        id: String,
        #[arg(long)]
        amount: f64,
        #[arg(long, value_enum, default_value_t = Method::Cash)]
        method: Method,
        #[arg(long)]
        bank: Option<String>,
        #[arg(long)]
        reference: Option<String>,
        #[arg(long)]
        depositor: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Record an expense
    Expense {
        #[arg(long)]
        category: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        currency: Option<Currency>,
        #[arg(long)]
        vendor: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Flag unpaid credits past their due date as overdue
    RefreshOverdue {
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Export the ledger or the profit-and-loss statement as CSV
    Export {
        #[arg(long, value_enum)]
        report: Report,
        #[arg(long)]
        output: PathBuf,
        /// Date filter, e.g. `start:2024-01-01 end:2024-01-31` or `date:2024-01-01..`
        #[arg(long, default_value = "")]
        range: DateRange,
        #[arg(long)]
        currency: Option<Currency>,
    },
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn failed(state: &LoadState) -> Result<(), Box<dyn std::error::Error>> {
    match state {
        LoadState::Failed(msg) => Err(msg.clone().into()),
        _ => Ok(()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();
    let cfg = load_config(&cli.config)?;
    let mut store = cfg.open_store()?;
    let default_currency = cfg.ledger.default_currency;

    match cli.command {
        Commands::Ledger { range, page } => {
            let mut screen = LedgerScreen::new(cfg.ledger.page_size, cfg.ledger.options());
            failed(screen.refresh(store.as_ref(), range))?;
            if let Some(paginator) = screen.paginator_mut() {
                paginator.go_to(page);
                println!(
                    "Page {} of {} ({} entries)",
                    paginator.current_page(),
                    paginator.total_pages(),
                    paginator.total_items()
                );
            }
            for e in screen.page_items() {
                println!(
                    "{} | {} | {} | {}",
                    e.date,
                    e.kind,
                    e.description,
                    e.currency.format(e.amount)
                );
            }
        }
        Commands::Pnl { range, currency } => {
            let mut screen = ProfitAndLossScreen::new(currency.unwrap_or(default_currency));
            failed(screen.refresh(store.as_ref(), range))?;
            if let Some(pnl) = screen.report() {
                let c = pnl.currency;
                println!("Profit and loss ({}) for {}", c, screen.range());
                for (category, amount) in &pnl.revenue {
                    println!("  {category}: {}", c.format(*amount));
                }
                println!("Total revenue: {}", c.format(pnl.total_revenue));
                println!("Cost of goods sold: {}", c.format(pnl.total_cogs));
                println!("Gross profit: {}", c.format(pnl.gross_profit));
                println!(
                    "Operating expenses: {}",
                    c.format(pnl.total_operating_expenses)
                );
                println!("Net profit: {}", c.format(pnl.net_profit));
            }
        }
        Commands::Dashboard { as_of, recent } => {
            let as_of = as_of.unwrap_or_else(today);
            let sources = fetch_sources(store.as_ref(), &DateRange::new(None, Some(as_of)))?;
            let dash = build_dashboard(&sources, as_of, recent, &cfg.ledger.options());
            for s in &dash.totals {
                let c = s.currency;
                println!(
                    "{c}: sales {} | credit payments {} | deposits {} | \
                     expenses {} | receivable {} | payable {}",
                    c.format(s.cash_sales),
                    c.format(s.credit_payments),
                    c.format(s.deposits),
                    c.format(s.expenses),
                    c.format(s.outstanding_receivables),
                    c.format(s.outstanding_payables)
                );
            }
            println!("Overdue credit sales: {}", dash.overdue_credit_sales);
            for e in &dash.recent {
                println!("{} | {} | {}", e.date, e.kind, e.currency.format(e.amount));
            }
        }
        Commands::CashSale {
            item,
            amount,
            tendered,
            currency,
            customer,
            description,
            date,
            due,
        } => {
            let receipt = record_cash_sale(
                store.as_mut(),
                NewCashSale {
                    date: date.unwrap_or_else(today),
                    item: RevenueCategory::from_label(&item),
                    amount_due: amount,
                    tendered: tendered.unwrap_or(amount),
                    currency: currency.unwrap_or(default_currency),
                    customer_name: customer,
                    description,
                    due_date: due,
                },
            )?;
            if let Some(cash) = &receipt.cash_sale {
                println!("Cash sale {}", cash.id);
            }
            if let Some(credit) = &receipt.credit_sale {
                println!(
                    "Credit sale {} for {}",
                    credit.id,
                    credit.currency.format(credit.balance_due)
                );
            }
        }
        Commands::PayCredit {
            id,
            amount,
            method,
            bank,
            reference,
            depositor,
            date,
        } => {
            let method = match method {
                Method::Cash => PaymentMethod::Cash,
                Method::Deposit => PaymentMethod::Deposit {
                    bank_name: bank.unwrap_or_default(),
                    reference_number: reference.unwrap_or_default(),
                    depositor_name: depositor.unwrap_or_default(),
                },
            };
            let sale = record_credit_payment(
                store.as_mut(),
                &id,
                amount,
                method,
                date.unwrap_or_else(today),
            )?;
            println!(
                "Balance due on {}: {} ({:?})",
                sale.id,
                sale.currency.format(sale.balance_due),
                sale.status
            );
        }
        Commands::Expense {
            category,
            description,
            amount,
            currency,
            vendor,
            date,
        } => {
            let expense = record_expense(
                store.as_mut(),
                NewExpense {
                    date: date.unwrap_or_else(today),
                    category: ExpenseCategory::from_label(&category),
                    description,
                    amount,
                    currency: currency.unwrap_or(default_currency),
                    vendor_id: vendor,
                },
            )?;
            println!("Expense {}", expense.id);
        }
        Commands::RefreshOverdue { as_of } => {
            let updated = refresh_overdue(store.as_mut(), as_of.unwrap_or_else(today))?;
            println!("{updated} credits marked overdue");
        }
        Commands::Export {
            report,
            output,
            range,
            currency,
        } => {
            let file = File::create(&output)?;
            match report {
                Report::Ledger => {
                    let mut screen =
                        LedgerScreen::new(cfg.ledger.page_size, cfg.ledger.options());
                    failed(screen.refresh(store.as_ref(), range))?;
                    let entries = screen.paginator().map(|p| p.items()).unwrap_or(&[]);
                    write_ledger_csv(file, entries)?;
                }
                Report::Pnl => {
                    let mut screen =
                        ProfitAndLossScreen::new(currency.unwrap_or(default_currency));
                    failed(screen.refresh(store.as_ref(), range))?;
                    if let Some(pnl) = screen.report() {
                        write_pnl_csv(file, pnl)?;
                    }
                }
            }
            info!(path = %output.display(), "Export written");
        }
    }

    Ok(())
}

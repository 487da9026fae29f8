//! # pdv - Line-Oriented Checkout Terminal
//!
//! Drives a [`CheckoutSession`] from stdin, one command per line.
//!
//! ## Usage
//! ```bash
//! cargo run -p pdv-client --bin pdv
//! cargo run -p pdv-client --bin pdv -- --config ./pdv.toml
//! PDV_BACKEND_MODE=http PDV_BASE_URL=http://localhost:8080/api cargo run -p pdv-client --bin pdv
//! ```
//!
//! ## Commands
//! ```text
//! scan <code|text>          look up now (barcode hit adds the item)
//! pick <n>                  add result n
//! qty <line> <+/-n>         change quantity of a line
//! rm <line>                 remove a line
//! discount <valor>          set discount (e.g. 10,50)
//! customer <name> [| doc]   set customer name and CPF/CNPJ
//! pay <method> [valor]      add payment (default: remaining balance)
//! unpay <n>                 remove payment n
//! quick [n]                 list cash shortcuts / pay shortcut n in cash
//! finalize | f9             submit the sale
//! suspend  | f8             hold the sale
//! cancel   | esc            discard the sale (asks for confirmation)
//! show                      print the transaction
//! quit
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pdv_client::{
    ActionOutcome, BackendMode, CatalogLookup, CheckoutSession, HttpBackend, LocalBackend, PdvConfig,
    SaleSubmission, DEFAULT_LOG_FILTER,
};
use pdv_core::{Action, LookupOutcome, Money, PaymentMethod, Receipt, Transaction};
use pdv_store::{Database, DbConfig};

type Input = Lines<BufReader<Stdin>>;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn config_path_from_args() -> Option<PathBuf> {
    let args: Vec<String> = std::env::args().collect();
    args.iter()
        .position(|a| a == "--config" || a == "-c")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
}

/// Builds both collaborators from the backend settings.
async fn build_backend(
    config: &PdvConfig,
) -> Result<(Arc<dyn CatalogLookup>, Arc<dyn SaleSubmission>), Box<dyn std::error::Error>> {
    match config.backend.mode {
        BackendMode::Http => {
            let base_url = config.backend.base_url.clone().unwrap_or_default();
            let backend = Arc::new(HttpBackend::new(base_url, config.timeout())?);
            info!(base_url = %backend.base_url(), "Using HTTP backend");
            let lookup: Arc<dyn CatalogLookup> = backend.clone();
            Ok((lookup, backend))
        }
        BackendMode::Local => {
            let backend = match config.database_path() {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    let db = Database::new(DbConfig::new(&path)).await?;
                    info!(path = %path.display(), "Using local SQLite backend");
                    LocalBackend::from_database(&db)
                }
                None => {
                    warn!("Using in-memory backend, nothing will be kept");
                    LocalBackend::in_memory(Vec::new())
                }
            };
            let backend = Arc::new(
                backend
                    .with_terminal_code(config.terminal.code.clone())
                    .with_search_limit(config.backend.search_limit),
            );
            let lookup: Arc<dyn CatalogLookup> = backend.clone();
            Ok((lookup, backend))
        }
    }
}

// =============================================================================
// Rendering
// =============================================================================

fn print_transaction(tx: &Transaction) {
    if tx.is_empty() {
        println!("  (carrinho vazio)");
    }
    for (i, item) in tx.line_items().iter().enumerate() {
        println!(
            "  {:>2}. {:<32} {:>3} x {:>12} = {:>12}",
            i + 1,
            item.name(),
            item.quantity(),
            item.unit_price().to_string(),
            item.line_total().to_string()
        );
    }
    for (i, payment) in tx.payments().iter().enumerate() {
        println!("  pag {}. {:<10} {}", i + 1, payment.method().label(), payment.amount());
    }
    println!("  Subtotal: {}   Desconto: {}   Total: {}", tx.subtotal(), tx.discount(), tx.total());
    println!(
        "  Pago: {}   Falta: {}   Troco: {}   [{:?}]",
        tx.total_paid(),
        tx.balance_due(),
        tx.change_due(),
        tx.payment_state()
    );
}

fn print_receipt(label: &str, receipt: &Receipt) {
    match receipt.field("receiptNumber").or_else(|| receipt.field("id")) {
        Some(number) => println!("{} ({})", label, number),
        None => println!("{}", label),
    }
}

fn parse_index(arg: Option<&str>) -> Option<usize> {
    arg.and_then(|a| a.parse::<usize>().ok())
        .filter(|n| *n >= 1)
        .map(|n| n - 1)
}

fn line_id(tx: &Transaction, arg: Option<&str>) -> Option<String> {
    parse_index(arg)
        .and_then(|i| tx.line_items().get(i))
        .map(|item| item.catalog_id().to_string())
}

// =============================================================================
// Commands
// =============================================================================

async fn handle_command(
    session: &mut CheckoutSession,
    input: &mut Input,
    line: &str,
) -> Result<bool, Box<dyn std::error::Error>> {
    let line = line.trim();
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    let mut args = rest.split_whitespace();

    match command.to_lowercase().as_str() {
        "" => {}
        "quit" | "exit" => return Ok(false),
        "help" => println!("scan pick qty rm discount customer pay unpay quick finalize suspend cancel show quit"),
        "show" => print_transaction(session.transaction()),

        "scan" => match session.scan(rest).await? {
            LookupOutcome::BarcodeHit(entry) => {
                println!("+ {} {}", entry.name, entry.unit_price);
                if !entry.is_in_stock() {
                    println!("  aviso: sem estoque");
                }
            }
            LookupOutcome::Results(0) => println!("nenhum produto encontrado"),
            LookupOutcome::Results(_) => {
                for (i, entry) in session.search().results().iter().enumerate() {
                    println!(
                        "  {:>2}. [{}] {} {} (estoque {})",
                        i + 1,
                        entry.code,
                        entry.name,
                        entry.unit_price,
                        entry.stock_on_hand
                    );
                }
            }
            LookupOutcome::Stale => {}
        },

        "pick" => match parse_index(args.next()) {
            Some(index) => match session.select_result(index)? {
                Some(item) => println!("+ {} (qtd {})", item.name(), item.quantity()),
                None => println!("resultado inexistente"),
            },
            None => println!("uso: pick <n>"),
        },

        "qty" => {
            let id = line_id(session.transaction(), args.next());
            let delta = args.next().and_then(|d| d.parse::<i64>().ok());
            match (id, delta) {
                (Some(id), Some(delta)) => {
                    let quantity = session.transaction_mut().change_quantity(&id, delta)?;
                    println!("quantidade: {}", quantity);
                }
                _ => println!("uso: qty <linha> <+/-n>"),
            }
        }

        "rm" => match line_id(session.transaction(), args.next()) {
            Some(id) => {
                let removed = session.transaction_mut().remove_item(&id)?;
                println!("- {}", removed.name());
            }
            None => println!("uso: rm <linha>"),
        },

        "discount" => {
            let amount = Money::parse(rest)?;
            session.transaction_mut().set_discount(amount);
            println!("desconto: {}", session.transaction().discount());
        }

        "customer" => {
            let (name, document) = rest.split_once('|').unwrap_or((rest, ""));
            session.transaction_mut().set_customer(name, document);
            let tx = session.transaction();
            println!(
                "cliente: {} {}",
                tx.customer_name().unwrap_or("-"),
                tx.customer_document().unwrap_or("")
            );
        }

        "pay" => {
            let method = match args.next() {
                Some(m) => m.parse::<PaymentMethod>()?,
                None => {
                    println!("uso: pay <dinheiro|pix|credito|debito> [valor]");
                    return Ok(true);
                }
            };
            let amount = match args.next() {
                Some(raw) => Some(Money::parse(raw)?),
                None => session.transaction().suggested_payment_amount(),
            };
            let added = match amount {
                Some(amount) => session.transaction_mut().add_payment(method, amount),
                None => false,
            };
            if added {
                print_transaction(session.transaction());
            } else {
                println!("pagamento ignorado");
            }
        }

        "unpay" => match parse_index(args.next()) {
            Some(index) => {
                let removed = session.transaction_mut().remove_payment(index)?;
                println!("- {} {}", removed.method(), removed.amount());
            }
            None => println!("uso: unpay <n>"),
        },

        "quick" => {
            let amounts = session.transaction().cash_quick_amounts();
            match parse_index(args.next()).and_then(|i| amounts.get(i).copied()) {
                Some(amount) => {
                    session.transaction_mut().add_payment(PaymentMethod::Cash, amount);
                    print_transaction(session.transaction());
                }
                None => {
                    for (i, amount) in amounts.iter().enumerate() {
                        println!("  {}. {}", i + 1, amount);
                    }
                }
            }
        }

        "finalize" | "f9" => {
            if let ActionOutcome::Finalized(receipt) = session.dispatch(Action::Finalize).await? {
                print_receipt("venda finalizada", &receipt);
            }
        }

        "suspend" | "f8" => {
            if let ActionOutcome::Suspended(receipt) = session.dispatch(Action::Suspend).await? {
                print_receipt("venda suspensa", &receipt);
            }
        }

        "cancel" | "esc" => {
            if !session.is_enabled(Action::Cancel) {
                println!("carrinho vazio");
                return Ok(true);
            }
            println!("cancelar a venda? (s/n)");
            let answer = input.next_line().await?.unwrap_or_default();
            if answer.trim().eq_ignore_ascii_case("s") {
                session.dispatch(Action::Cancel).await?;
                println!("venda cancelada");
            }
        }

        other => println!("comando desconhecido: {} (help)", other),
    }

    Ok(true)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = PdvConfig::load(config_path_from_args())?;
    info!(mode = %config.backend.mode, terminal = %config.terminal.code, "Starting checkout terminal");

    let (lookup, submission) = build_backend(&config).await?;
    let mut session = CheckoutSession::from_config(&config, lookup, submission);

    let mut input: Input = BufReader::new(tokio::io::stdin()).lines();
    println!("PDV pronto. Digite 'help' para os comandos.");

    while let Some(line) = input.next_line().await? {
        match handle_command(&mut session, &mut input, &line).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => match err.downcast_ref::<pdv_client::CheckoutError>() {
                Some(checkout) => println!("erro: {}", checkout.user_message()),
                None => println!("erro: {}", err),
            },
        }
    }

    info!("Checkout terminal stopped");
    Ok(())
}

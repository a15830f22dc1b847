//! Demo application: a Controller drives deposits through a Service backed by
//! an in-memory Dao, all wired through one dispatcher.

use std::collections::HashMap;
use std::process::ExitCode;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use anyhow::Context as _;
use appwire::{
    telemetry, values, App, AppConfig, Call, Component, ComponentContext, DispatchService,
    Dispatcher, DispatcherConfig, LogFormat, TraceHook, Value,
};
use async_trait::async_trait;
use clap::Parser;
use parking_lot::Mutex;
use tower::ServiceExt;

#[derive(Debug, Parser)]
#[command(name = "appwire-demo", about = "Wire a Controller, Service and Dao through one dispatcher")]
struct Args {
    /// Account to deposit into.
    #[arg(long, default_value = "alice")]
    account: String,

    /// Amounts to deposit, in order. Repeat the flag for several deposits.
    #[arg(long = "deposit", default_values_t = [10_i64, 5])]
    deposits: Vec<i64>,

    #[arg(long, value_enum, default_value_t = LogFormat::Text, env = "APPWIRE_LOG_FORMAT")]
    log_format: LogFormat,

    #[arg(long, default_value_t = 1_000)]
    slow_call_threshold_ms: u64,
}

// ---------------------------------------------------------------------------
// Dao
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Dao {
    balances: Arc<Mutex<HashMap<String, i64>>>,
}

impl Component for Dao {
    fn name(&self) -> &'static str {
        "dao"
    }

    fn wire(&self, dispatcher: &Dispatcher) -> anyhow::Result<()> {
        let balances = self.balances.clone();
        dispatcher.register("dao.balance", move |account: String| {
            balances.lock().get(&account).copied().unwrap_or(0)
        })?;

        let balances = self.balances.clone();
        dispatcher.register("dao.store", move |account: String, balance: i64| {
            balances.lock().insert(account, balance);
        })?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

struct Service {
    dispatcher: Weak<Dispatcher>,
}

fn first_i64(results: Vec<Value>) -> anyhow::Result<i64> {
    results
        .into_iter()
        .next()
        .and_then(|value| value.downcast::<i64>().ok())
        .context("expected one i64 result")
}

impl Component for Service {
    fn name(&self) -> &'static str {
        "service"
    }

    fn wire(&self, dispatcher: &Dispatcher) -> anyhow::Result<()> {
        let handle = self.dispatcher.clone();
        dispatcher.register(
            "service.deposit",
            move |account: String, amount: i64| -> anyhow::Result<i64> {
                anyhow::ensure!(amount > 0, "deposit must be positive, got {amount}");
                let dispatcher = handle.upgrade().context("dispatcher dropped")?;
                let current = first_i64(dispatcher.call("dao.balance", values![account.clone()])?)?;
                let updated = current
                    .checked_add(amount)
                    .context("balance overflow")?;
                dispatcher.call("dao.store", values![account, updated])?;
                Ok(updated)
            },
        )?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

struct Controller {
    account: String,
    deposits: Vec<i64>,
    calls: Arc<AtomicU64>,
}

#[async_trait]
impl Component for Controller {
    fn name(&self) -> &'static str {
        "controller"
    }

    fn wire(&self, dispatcher: &Dispatcher) -> anyhow::Result<()> {
        dispatcher.add_shared_before_hook(Arc::new(TraceHook));
        let calls = self.calls.clone();
        dispatcher.add_before_hook(move |_name, _args| {
            calls.fetch_add(1, Ordering::Relaxed);
            Ok(())
        });
        dispatcher.add_shared_after_hook(Arc::new(TraceHook));
        Ok(())
    }

    async fn start(&self, ctx: &ComponentContext) -> anyhow::Result<()> {
        let service = DispatchService::new(Arc::clone(&ctx.dispatcher));
        for &amount in &self.deposits {
            let results = service
                .clone()
                .oneshot(Call::new(
                    "service.deposit",
                    values![self.account.clone(), amount],
                ))
                .await?;
            let balance = first_i64(results)?;
            tracing::info!(account = %self.account, amount, balance, "deposit applied");
        }
        Ok(())
    }

    async fn shutdown(&self) -> anyhow::Result<()> {
        tracing::info!(calls = self.calls.load(Ordering::Relaxed), "controller stopped");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

async fn run(args: Args) -> anyhow::Result<()> {
    let config = AppConfig {
        name: "appwire-demo".to_string(),
        dispatcher: DispatcherConfig {
            slow_call_threshold_ms: args.slow_call_threshold_ms,
        },
        log_format: args.log_format,
        ..AppConfig::default()
    };
    let app = App::new(config);

    app.add_component(Controller {
        account: args.account,
        deposits: args.deposits,
        calls: Arc::new(AtomicU64::new(0)),
    })?;
    app.add_component(Service {
        dispatcher: Arc::downgrade(&app.dispatcher()),
    })?;
    app.add_component(Dao::default())?;

    app.start().await?;
    app.shutdown().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(err) = telemetry::init_tracing(args.log_format, "info") {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "appwire-demo aborted");
            ExitCode::FAILURE
        }
    }
}

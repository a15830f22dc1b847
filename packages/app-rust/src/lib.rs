//! `appwire` — named-operation dispatcher with before/after hook chains, plus
//! the component wiring layer that hosts Controller, Service and Dao parts.

pub mod app;
pub mod config;
pub mod dispatch;
pub mod telemetry;

pub use app::{App, AppError, Component, ComponentContext};
pub use appwire_core::{values, DispatchError, HookStage, SignatureError, Value};
pub use config::{AppConfig, DispatcherConfig, LogFormat};
pub use dispatch::{AfterHook, BeforeHook, Call, DispatchService, Dispatcher, TraceHook};


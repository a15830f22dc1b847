//! Controller -> Service -> Dao chain wired through `App`.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use anyhow::Context as _;
use appwire::{
    values, App, AppConfig, Call, Component, DispatchError, DispatchService, Dispatcher, Value,
};
use parking_lot::Mutex;
use tower::ServiceExt;

#[derive(Default)]
struct Dao {
    rows: Arc<Mutex<HashMap<u32, String>>>,
}

impl Component for Dao {
    fn name(&self) -> &'static str {
        "dao"
    }

    fn wire(&self, dispatcher: &Dispatcher) -> anyhow::Result<()> {
        let rows = self.rows.clone();
        dispatcher.register("dao.find", move |id: u32| rows.lock().get(&id).cloned())?;
        let rows = self.rows.clone();
        dispatcher.register("dao.save", move |id: u32, name: String| {
            rows.lock().insert(id, name);
        })?;
        Ok(())
    }
}

struct UserService {
    dispatcher: Weak<Dispatcher>,
}

impl Component for UserService {
    fn name(&self) -> &'static str {
        "service"
    }

    fn wire(&self, dispatcher: &Dispatcher) -> anyhow::Result<()> {
        let handle = self.dispatcher.clone();
        dispatcher.register(
            "user.rename",
            move |id: u32, name: String| -> anyhow::Result<Option<String>> {
                let dispatcher = handle.upgrade().context("dispatcher dropped")?;
                let previous = dispatcher
                    .call("dao.find", values![id])?
                    .into_iter()
                    .next()
                    .and_then(|v| v.downcast::<Option<String>>().ok())
                    .flatten();
                dispatcher.call("dao.save", values![id, name])?;
                Ok(previous)
            },
        )?;
        Ok(())
    }
}

fn build_app(audit: &Arc<Mutex<Vec<String>>>) -> App {
    let app = App::new(AppConfig::default());
    app.add_component(UserService {
        dispatcher: Arc::downgrade(&app.dispatcher()),
    })
    .unwrap();
    app.add_component(Dao::default()).unwrap();

    let sink = audit.clone();
    app.dispatcher().add_before_hook(move |name, _args| {
        sink.lock().push(name.to_string());
        Ok(())
    });
    app
}

fn take_previous(results: Vec<Value>) -> Option<String> {
    results
        .into_iter()
        .next()
        .and_then(|v| v.downcast::<Option<String>>().ok())
        .flatten()
}

#[tokio::test]
async fn service_reaches_dao_through_dispatcher() {
    let audit = Arc::new(Mutex::new(Vec::new()));
    let app = build_app(&audit);
    app.start().await.unwrap();

    let svc = DispatchService::new(app.dispatcher());
    let first = svc
        .clone()
        .oneshot(Call::new("user.rename", values![7_u32, "ada".to_string()]))
        .await
        .unwrap();
    assert_eq!(take_previous(first), None);

    let second = svc
        .oneshot(Call::new("user.rename", values![7_u32, "grace".to_string()]))
        .await
        .unwrap();
    assert_eq!(take_previous(second), Some("ada".to_string()));

    // Nested calls pass through the hooks too.
    assert_eq!(
        *audit.lock(),
        vec![
            "user.rename",
            "dao.find",
            "dao.save",
            "user.rename",
            "dao.find",
            "dao.save",
        ]
    );
    app.shutdown().await.unwrap();
}

#[tokio::test]
async fn nested_signature_mismatch_surfaces_to_caller() {
    let audit = Arc::new(Mutex::new(Vec::new()));
    let app = build_app(&audit);
    app.start().await.unwrap();

    let err = app
        .dispatcher()
        .call("user.rename", values![7_i64, "ada".to_string()])
        .unwrap_err();
    assert!(matches!(
        err,
        DispatchError::SignatureMismatch { ref name, .. } if name == "user.rename"
    ));
    assert!(err.to_string().contains("expected `u32`, got `i64`"));
}

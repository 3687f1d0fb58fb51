//! End-to-end dispatch behaviour through a test transport bridge.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use trellis_dispatch::{
    ApplicationContext, Argument, AssetConfig, AssetFilter, ControllerDescriptor,
    ControllerMethod, ControllerParameter, DispatchError, HandlerResult, OPERATION_PARAMETER,
    OPERATION_PROPERTY, Request, RequestBridge, RequestFilter, ScopeController, StaticRegistry,
    write_update_target,
};
use trellis_types::{ParameterMap, Phase, PropertyMap, Response, Update, SCRIPT, STYLESHEET};
use trellis_uri::UriWriter;

/// What the bridge observed when its completion hook ran.
#[derive(Debug, Default)]
struct Delivery {
    body: Option<String>,
    properties: Option<PropertyMap>,
    location: Option<String>,
    none: bool,
}

struct TestBridge {
    phase: Phase,
    parameters: ParameterMap,
    properties: HashMap<String, String>,
    fail_end: bool,
    began: bool,
    delivered: Option<Delivery>,
}

impl TestBridge {
    fn new(phase: Phase) -> Self {
        Self {
            phase,
            parameters: ParameterMap::new(),
            properties: HashMap::new(),
            fail_end: false,
            began: false,
            delivered: None,
        }
    }

    fn with_parameter(mut self, name: &str, value: &str) -> Self {
        self.parameters.append(name, value);
        self
    }

    fn with_property(mut self, name: &str, value: &str) -> Self {
        self.properties.insert(name.to_owned(), value.to_owned());
        self
    }

    fn failing_end(mut self) -> Self {
        self.fail_end = true;
        self
    }

    fn delivery(&self) -> &Delivery {
        self.delivered.as_ref().expect("completion hook ran")
    }
}

impl RequestBridge for TestBridge {
    fn phase(&self) -> Phase {
        self.phase
    }

    fn property(&self, name: &str) -> Option<String> {
        self.properties.get(name).cloned()
    }

    fn parameters(&self) -> &ParameterMap {
        &self.parameters
    }

    fn begin(&mut self, _request: &Request<'_>) {
        self.began = true;
    }

    fn end(&mut self, response: Option<&Response>) -> io::Result<()> {
        if self.fail_end {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"));
        }
        let mut delivery = Delivery::default();
        match response {
            Some(Response::Render(render)) => {
                let mut sink = Vec::new();
                render.body().stream_to(&mut sink)?;
                delivery.body = Some(String::from_utf8_lossy(&sink).into_owned());
                delivery.properties = Some(render.properties().clone());
            }
            Some(Response::Update(update)) => {
                let mut writer = UriWriter::new(String::new());
                write_update_target(update, &["app"], &mut writer)
                    .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;
                delivery.location = Some(writer.into_inner());
            }
            Some(Response::Redirect(redirect)) => {
                delivery.location = Some(redirect.location().to_owned());
            }
            Some(Response::Content(content)) => {
                let mut sink = Vec::new();
                content.body().stream_to(&mut sink)?;
                delivery.body = Some(String::from_utf8_lossy(&sink).into_owned());
            }
            None => delivery.none = true,
        }
        self.delivered = Some(delivery);
        Ok(())
    }
}

/// Logs its traversal around the inner layers.
struct RecordingFilter {
    name: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

impl RequestFilter for RecordingFilter {
    fn invoke(&self, request: &mut Request<'_>) -> Result<(), DispatchError> {
        self.log
            .lock()
            .expect("log lock")
            .push(format!("{}:before", self.name));
        request.invoke()?;
        self.log
            .lock()
            .expect("log lock")
            .push(format!("{}:after", self.name));
        Ok(())
    }
}

/// Terminates the chain without calling through.
struct DenyFilter;

impl RequestFilter for DenyFilter {
    fn invoke(&self, request: &mut Request<'_>) -> Result<(), DispatchError> {
        request.set_response(Response::redirect("/login"));
        Ok(())
    }
}

/// Terminates the chain without calling through or answering.
struct SwallowFilter;

impl RequestFilter for SwallowFilter {
    fn invoke(&self, _request: &mut Request<'_>) -> Result<(), DispatchError> {
        Ok(())
    }
}

/// Captures the application parameter map the chain actually saw.
struct CaptureFilter {
    seen: Arc<Mutex<Option<ParameterMap>>>,
}

impl RequestFilter for CaptureFilter {
    fn invoke(&self, request: &mut Request<'_>) -> Result<(), DispatchError> {
        *self.seen.lock().expect("capture lock") = Some(request.parameters().clone());
        request.invoke()
    }
}

fn render_method(id: &str, parameters: &[&str]) -> ControllerMethod {
    let mut method = ControllerMethod::new(id, Phase::Render, |_: &[Argument]| -> HandlerResult {
        Ok(Response::render("<main/>"))
    });
    for name in parameters {
        method = method.with_parameter(ControllerParameter::new(*name));
    }
    method
}

fn context_with(descriptor: ControllerDescriptor, registry: StaticRegistry) -> ApplicationContext {
    ApplicationContext::new("shell", descriptor, Arc::new(registry))
}

#[test]
fn render_dispatch_delivers_assets_after_application_values() {
    let config = AssetConfig::from_json(
        r#"{
            "package": "shell.ui",
            "stylesheets": [{"src": "site.css"}],
            "scripts": [{"location": "external", "src": "https://cdn.example.org/lib.js"}]
        }"#,
    )
    .expect("valid asset config");

    let method = ControllerMethod::new("index", Phase::Render, |_: &[Argument]| -> HandlerResult {
        let mut properties = PropertyMap::new();
        properties.add_value(STYLESHEET, "/inline/first.css");
        Ok(Response::Render(trellis_types::Render::with_properties(
            properties,
            Arc::new("<main/>".to_owned()),
        )))
    })
    .with_parameter(ControllerParameter::new("page"));

    let registry =
        StaticRegistry::new().with_filter(Arc::new(AssetFilter::from_config(&config)));
    let context = context_with(ControllerDescriptor::new().with_method(method), registry);

    let mut bridge = TestBridge::new(Phase::Render).with_parameter("page", "home");
    context.invoke(&mut bridge).expect("dispatch succeeds");

    assert!(bridge.began);
    let delivery = bridge.delivery();
    assert_eq!(delivery.body.as_deref(), Some("<main/>"));
    let properties = delivery.properties.as_ref().expect("render properties");
    assert_eq!(
        properties.values(STYLESHEET),
        ["/inline/first.css", "/shell/ui/site.css"]
    );
    assert_eq!(properties.values(SCRIPT), ["https://cdn.example.org/lib.js"]);
}

#[test]
fn explicit_operation_parameter_picks_the_named_operation() {
    let save_ran = Arc::new(AtomicBool::new(false));
    let ran = Arc::clone(&save_ran);
    let save = ControllerMethod::new("save", Phase::Action, move |_: &[Argument]| -> HandlerResult {
        ran.store(true, Ordering::SeqCst);
        Ok(Response::Update(Update::new("saved").with_parameter("id", "4 2")))
    })
    .with_parameter(ControllerParameter::new("id"));
    let delete = ControllerMethod::new("delete", Phase::Action, |_: &[Argument]| -> HandlerResult {
        Ok(Response::update("deleted"))
    })
    .with_parameter(ControllerParameter::new("id"));

    let context = context_with(
        ControllerDescriptor::new().with_method(save).with_method(delete),
        StaticRegistry::new(),
    );

    let mut bridge = TestBridge::new(Phase::Action)
        .with_parameter(OPERATION_PARAMETER, "save")
        .with_parameter("id", "7");
    context.invoke(&mut bridge).expect("dispatch succeeds");

    assert!(save_ran.load(Ordering::SeqCst));
    // The bridge turned the update into a relative target, reserved
    // operation parameter first, then the update's parameters encoded.
    assert_eq!(
        bridge.delivery().location.as_deref(),
        Some("app?trellis.op=saved&id=4%202")
    );
}

#[test]
fn in_band_operation_overrides_the_bridge_declared_one() {
    let picked = Arc::new(Mutex::new(Vec::new()));
    let descriptor = ["first", "second"].iter().fold(
        ControllerDescriptor::new(),
        |descriptor, id| {
            let log = Arc::clone(&picked);
            let id_owned = (*id).to_owned();
            descriptor.with_method(ControllerMethod::new(
                *id,
                Phase::Render,
                move |_: &[Argument]| -> HandlerResult {
                    log.lock().expect("log lock").push(id_owned.clone());
                    Ok(Response::render("<main/>"))
                },
            ))
        },
    );
    let context = context_with(descriptor, StaticRegistry::new());

    let mut bridge = TestBridge::new(Phase::Render)
        .with_property(OPERATION_PROPERTY, "first")
        .with_parameter(OPERATION_PARAMETER, "second");
    context.invoke(&mut bridge).expect("dispatch succeeds");

    assert_eq!(*picked.lock().expect("log lock"), ["second"]);
}

#[test]
fn reserved_parameters_never_reach_the_application() {
    let seen = Arc::new(Mutex::new(None));
    let registry = StaticRegistry::new().with_filter(Arc::new(CaptureFilter {
        seen: Arc::clone(&seen),
    }));
    let context = context_with(
        ControllerDescriptor::new().with_method(render_method("index", &["page"])),
        registry,
    );

    let mut bridge = TestBridge::new(Phase::Render)
        .with_parameter(OPERATION_PARAMETER, "index")
        .with_parameter("trellis.future", "ignored")
        .with_parameter("page", "home");
    context.invoke(&mut bridge).expect("dispatch succeeds");

    let guard = seen.lock().expect("capture lock");
    let parameters = guard.as_ref().expect("filter captured parameters");
    assert!(!parameters.contains(OPERATION_PARAMETER));
    assert!(!parameters.contains("trellis.future"));
    assert_eq!(parameters.first("page"), Some("home"));
}

#[test]
fn filters_wrap_in_registration_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let inner_log = Arc::clone(&log);
    let method = ControllerMethod::new("index", Phase::Render, move |_: &[Argument]| -> HandlerResult {
        inner_log.lock().expect("log lock").push("controller".to_owned());
        Ok(Response::render("<main/>"))
    });
    let registry = StaticRegistry::new()
        .with_filter(Arc::new(RecordingFilter {
            name: "outer",
            log: Arc::clone(&log),
        }))
        .with_filter(Arc::new(RecordingFilter {
            name: "inner",
            log: Arc::clone(&log),
        }));
    let context = context_with(ControllerDescriptor::new().with_method(method), registry);

    let mut bridge = TestBridge::new(Phase::Render);
    context.invoke(&mut bridge).expect("dispatch succeeds");

    assert_eq!(
        *log.lock().expect("log lock"),
        [
            "outer:before",
            "inner:before",
            "controller",
            "inner:after",
            "outer:after",
        ]
    );
}

#[test]
fn short_circuiting_filter_skips_inner_layers() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let inner_log = Arc::clone(&log);
    let method = ControllerMethod::new("index", Phase::Render, move |_: &[Argument]| -> HandlerResult {
        inner_log.lock().expect("log lock").push("controller".to_owned());
        Ok(Response::render("<main/>"))
    });
    let registry = StaticRegistry::new()
        .with_filter(Arc::new(DenyFilter))
        .with_filter(Arc::new(RecordingFilter {
            name: "inner",
            log: Arc::clone(&log),
        }));
    let context = context_with(ControllerDescriptor::new().with_method(method), registry);

    let mut bridge = TestBridge::new(Phase::Render);
    context.invoke(&mut bridge).expect("dispatch succeeds");

    assert!(log.lock().expect("log lock").is_empty());
    assert_eq!(bridge.delivery().location.as_deref(), Some("/login"));
}

#[test]
fn terminated_chain_without_a_response_delivers_none() {
    let registry = StaticRegistry::new().with_filter(Arc::new(SwallowFilter));
    let context = context_with(
        ControllerDescriptor::new().with_method(render_method("index", &[])),
        registry,
    );

    let mut bridge = TestBridge::new(Phase::Render);
    context.invoke(&mut bridge).expect("dispatch succeeds");

    let delivery = bridge.delivery();
    assert!(delivery.none);
    assert!(delivery.body.is_none());
    assert!(delivery.location.is_none());
}

#[test]
fn controller_failure_wraps_the_cause_and_skips_completion() {
    let scope_active_inside = Arc::new(AtomicBool::new(false));
    let observed = Arc::clone(&scope_active_inside);
    let method = ControllerMethod::new("index", Phase::Render, move |_: &[Argument]| -> HandlerResult {
        observed.store(ScopeController::current().is_some(), Ordering::SeqCst);
        Err("backing store unavailable".to_owned().into())
    });
    let context = context_with(
        ControllerDescriptor::new().with_method(method),
        StaticRegistry::new(),
    );

    let mut bridge = TestBridge::new(Phase::Render);
    let error = context.invoke(&mut bridge).expect_err("dispatch fails");

    assert!(matches!(
        error,
        DispatchError::Invocation { ref operation, .. } if operation == "index"
    ));
    assert!(error.to_string().contains("backing store unavailable"));
    // The scope was live around the controller and is gone afterwards.
    assert!(scope_active_inside.load(Ordering::SeqCst));
    assert!(ScopeController::current().is_none());
    // A failed chain never reaches the completion hook.
    assert!(bridge.delivered.is_none());
}

#[test]
fn transport_failure_surfaces_as_a_transport_error() {
    let context = context_with(
        ControllerDescriptor::new().with_method(render_method("index", &[])),
        StaticRegistry::new(),
    );

    let mut bridge = TestBridge::new(Phase::Render).failing_end();
    let error = context.invoke(&mut bridge).expect_err("delivery fails");

    assert!(matches!(error, DispatchError::Transport { .. }));
    assert!(ScopeController::current().is_none());
}

#[test]
fn unresolvable_request_reports_phase_and_raw_parameters() {
    let context = context_with(
        ControllerDescriptor::new().with_method(render_method("index", &["page"])),
        StaticRegistry::new(),
    );

    // The explicit identifier is unknown, and there is no fallback to
    // signature matching.
    let mut bridge = TestBridge::new(Phase::Action)
        .with_parameter(OPERATION_PARAMETER, "publish")
        .with_parameter("page", "home");
    let error = context.invoke(&mut bridge).expect_err("nothing matches");

    let rendered = error.to_string();
    assert!(rendered.contains("phase 'action'"));
    assert!(rendered.contains("trellis.op=[publish]"));
    assert!(rendered.contains("page=[home]"));
    assert!(bridge.delivered.is_none());
}

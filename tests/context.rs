use std::rc::Rc;

use greyscript_lang::{
    Options, RuntimeErrorKind, Value,
    context::{ContextKind, Linkage, OperationContext},
    objects::{CallbackInner, MapInner},
};

fn global() -> Rc<OperationContext> {
    let api = MapInner::new();
    api.insert("print", CallbackInner::from_fn("print", |_| Ok(Value::Nil)));
    api.insert("answer", 42);
    OperationContext::api(&api, Rc::new(Options::default())).fork(ContextKind::Global, Linkage::Default)
}

#[test]
fn test_lookup_walks_the_chain() {
    let global = global();
    global.set("a", Value::from(1));
    let function = global.fork(ContextKind::Function, Linkage::Default);
    function.set("b", Value::from(2));

    assert_eq!(function.get("a"), Some(Value::from(1)));
    assert_eq!(function.get("b"), Some(Value::from(2)));
    assert_eq!(function.get("answer"), Some(Value::from(42)));
    assert_eq!(global.get("b"), None);
    assert!(matches!(
        function.lookup("c"),
        Err(greyscript_lang::Error::Runtime(e)) if e.kind == RuntimeErrorKind::Path { path: "c".into() }
    ));
}

#[test]
fn test_temporary_contexts_share_the_frame() {
    let global = global();
    let body = global.fork(ContextKind::Loop, Linkage::Temporary);
    body.set("i", Value::from(3));
    assert_eq!(global.get("i"), Some(Value::from(3)));
    assert!(Rc::ptr_eq(&body.locals(), &global.locals()));
    assert!(body.loop_state.is_some());
    assert!(global.loop_state.is_none());
}

#[test]
fn test_function_frames_reset_control_records() {
    let global = global();
    let body = global.fork(ContextKind::Loop, Linkage::Temporary);
    let call = body
        .fork_call(ContextKind::Function, Some(Value::from("me")), 1)
        .unwrap();
    assert!(call.loop_state.is_none());
    assert!(!Rc::ptr_eq(
        call.function_state.as_ref().unwrap(),
        global.function_state.as_ref().unwrap()
    ));
    assert_eq!(call.get("self"), Some(Value::from("me")));
    assert_eq!(global.get("self"), None);

    body.loop_state.as_ref().unwrap().is_break.set(true);
    assert!(body.should_stop());
    assert!(!call.should_stop());
}

#[test]
fn test_call_depth_limit() {
    let api = MapInner::new();
    let global = OperationContext::api(&api, Rc::new(Options::new().max_call_depth(2)))
        .fork(ContextKind::Global, Linkage::Default);
    assert!(global.fork_call(ContextKind::Function, None, 2).is_ok());
    assert!(matches!(
        global.fork_call(ContextKind::Function, None, 3),
        Err(greyscript_lang::Error::Runtime(e)) if e.kind == RuntimeErrorKind::StackOverflow(2)
    ));
}

#[test]
fn test_special_names() {
    let global = global();
    global.set("g", Value::from(1));
    let function = global.fork(ContextKind::Function, Linkage::Default);
    function.set("l", Value::from(2));

    let Some(Value::Map(locals)) = function.get("locals") else {
        panic!("locals is not a map");
    };
    assert_eq!(locals.get("l"), Some(Value::from(2)));
    let Some(Value::Map(globals)) = function.get("globals") else {
        panic!("globals is not a map");
    };
    assert_eq!(globals.get("g"), Some(Value::from(1)));
    assert!(Rc::ptr_eq(&function.global_context(), &global));
}

#[test]
fn test_extend_and_get_callable() {
    let global = global();
    let extra = MapInner::new();
    extra.insert("x", 1);
    extra.insert("y", 2);
    global.extend(&extra);
    assert_eq!(global.get("y"), Some(Value::from(2)));

    assert!(global.get_callable("print").is_ok());
    assert!(matches!(
        global.get_callable("x"),
        Err(greyscript_lang::Error::Runtime(e)) if matches!(e.kind, RuntimeErrorKind::NotCallable(_))
    ));
}

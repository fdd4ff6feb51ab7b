//! # Composition Tests
//!
//! Properties that only show up once transformers are stacked:
//! - which layer observes a call depends on what sits above it
//! - trace lines stay balanced, also when a call fails
//! - a retired layer leaves the rest of the stack unchanged
//! - failures travel through every layer untouched

use std::rc::Rc;

use compositional_transform::{
    countcalls, fix, memo, n_ary, trace, Arity, Counter, Disable, Fold, Function, Invocable,
    InvocableExt, Memoize, RecordingSink, StackConfig, TraceLine, Tracer, TransformError,
    Transformer, Value,
};

fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().copied().map(Value::Int).collect()
}

fn add() -> Function {
    Function::binary("add", |a, b| Ok(Value::Int(a.as_int()? + b.as_int()?)))
        .with_description("Adds two integers")
}

/// Checks that enter/exit lines pair up with equal depth and never underflow.
fn assert_balanced(events: &[TraceLine]) {
    let mut open: Vec<&TraceLine> = Vec::new();
    for event in events {
        if event.is_enter() {
            assert_eq!(event.depth, open.len(), "enter at unexpected depth");
            open.push(event);
        } else {
            let enter = open.pop().expect("exit without matching enter");
            assert_eq!(enter.depth, event.depth);
            assert_eq!(enter.indent, event.indent);
            assert_eq!(enter.args, event.args);
        }
    }
    assert!(open.is_empty(), "unclosed enter lines");
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_counter_inside_fold_sees_each_pair() {
    // counter below the adapter: one count per binary step
    let f = n_ary(countcalls(add())).unwrap();
    f.call(&ints(&[1, 2, 3, 4])).unwrap();
    assert_eq!(f.inner().calls(), 3);

    // counter above the adapter: one count per top-level call
    let g = countcalls(n_ary(add()).unwrap());
    g.call(&ints(&[1, 2, 3, 4])).unwrap();
    assert_eq!(g.calls(), 1);
}

#[test]
fn test_cache_at_most_once_per_tuple() {
    let f = memo(countcalls(n_ary(add()).unwrap()));
    let tuples = [ints(&[1]), ints(&[1, 2]), ints(&[2, 1]), ints(&[1, 2, 3])];

    for _ in 0..3 {
        for t in &tuples {
            f.call(t).unwrap();
        }
    }
    assert_eq!(f.inner().calls(), tuples.len() as u64);
    for t in &tuples {
        assert!(f.contains(t));
    }
}

#[test]
fn test_metadata_survives_any_stack() {
    let f = add()
        .n_ary()
        .unwrap()
        .countcalls()
        .memo()
        .with(&Tracer::new("  ").with_sink(Rc::new(RecordingSink::new())))
        .unwrap();
    assert_eq!(f.name(), "add");
    assert_eq!(f.description(), Some("Adds two integers"));
    assert_eq!(f.arity(), Arity::AtLeast(1));
}

// ============================================================================
// Trace Balance
// ============================================================================

#[test]
fn test_trace_balanced_over_mixed_calls() {
    let sink = Rc::new(RecordingSink::new());
    let fib = fix(|this| {
        let base = Function::unary("fib", move |n| {
            let n = n.as_int()?;
            if n < 0 {
                return Err(TransformError::failed("negative"));
            }
            if n <= 1 {
                return Ok(Value::Int(1));
            }
            let a = this.call(&[Value::Int(n - 1)])?.as_int()?;
            let b = this.call(&[Value::Int(n - 2)])?.as_int()?;
            Ok(Value::Int(a + b))
        });
        trace("..").with_sink(sink.clone()).wrap(base)
    });

    fib.call(&[Value::Int(4)]).unwrap();
    assert!(fib.call(&[Value::Int(-1)]).is_err());
    fib.call(&[Value::Int(2)]).unwrap();

    let events = sink.events();
    let enters = events.iter().filter(|e| e.is_enter()).count();
    assert_eq!(enters * 2, events.len());
    assert_balanced(&events);
    assert_eq!(fib.depth(), 0);
}

#[test]
fn test_failure_deep_in_recursion_unwinds_depth() {
    let sink = Rc::new(RecordingSink::new());
    let countdown = fix(|this| {
        let base = Function::unary("countdown", move |n| match n.as_int()? {
            0 => Err(TransformError::failed("liftoff aborted")),
            k => this.call(&[Value::Int(k - 1)]),
        });
        trace("_").with_sink(sink.clone()).wrap(base)
    });

    let err = countdown.call(&[Value::Int(3)]).unwrap_err();
    assert_eq!(err, TransformError::failed("liftoff aborted"));
    assert_eq!(countdown.depth(), 0);

    let lines = sink.lines();
    assert_eq!(lines.len(), 8);
    assert_eq!(lines[3], "___ --> countdown(0)");
    assert_eq!(lines[4], "___ <-- countdown(0) !! liftoff aborted");
    assert_eq!(lines[7], " <-- countdown(3) !! liftoff aborted");
    assert_balanced(&sink.events());
}

#[test]
fn test_trace_keeps_whole_floats_apart_from_ints() {
    let sink = Rc::new(RecordingSink::new());
    let base = Function::unary("half", |x| match x {
        Value::Int(i) => Ok(Value::Int(i / 2)),
        other => Ok(Value::Float(other.as_float()? / 2.0)),
    });
    let half = trace("").with_sink(sink.clone()).wrap(memo(base));

    assert_eq!(half.call(&[Value::Float(4.0)]), Ok(Value::Float(2.0)));
    assert_eq!(half.call(&[Value::Int(4)]), Ok(Value::Int(2)));
    assert_eq!(
        sink.lines(),
        vec![
            " --> half(4.0)",
            " <-- half(4.0) == 2.0",
            " --> half(4)",
            " <-- half(4) == 2",
        ]
    );
    assert_eq!(half.inner().len(), 2);
}

// ============================================================================
// Disabling
// ============================================================================

#[test]
fn test_disable_slot_changes_only_that_layer() {
    let with_memo = Counter.over(Memoize).over(Fold).apply(add()).unwrap();
    let without_memo = Counter.over(Disable).over(Fold).apply(add()).unwrap();

    for f in [&with_memo as &dyn Invocable, &without_memo as &dyn Invocable] {
        assert_eq!(f.call(&ints(&[4, 3, 2])), Ok(Value::Int(9)));
        assert_eq!(f.call(&ints(&[4, 3, 2])), Ok(Value::Int(9)));
    }
    assert_eq!(with_memo.calls(), 2);
    assert_eq!(without_memo.calls(), 2);
    assert_eq!(with_memo.inner().len(), 1);
    assert_eq!(without_memo.inner().arity(), Arity::AtLeast(1));
}

#[test]
fn test_config_retires_cache_from_json() {
    let config: StackConfig =
        serde_json::from_str(r#"{ "memo": false, "trace": false }"#).unwrap();

    let base = Function::binary("mul", |a, b| Ok(Value::Int(a.as_int()? * b.as_int()?)));
    let inner_count = Rc::new(countcalls(base));
    let stack = config
        .tracer()
        .over(config.memoize())
        .apply(Rc::clone(&inner_count))
        .unwrap();

    stack.call(&ints(&[6, 7])).unwrap();
    stack.call(&ints(&[6, 7])).unwrap();

    // cache disabled, so both calls reach the base
    assert_eq!(inner_count.calls(), 2);
    assert!(stack.on().is_none());
    assert_eq!(stack.name(), "mul");
}

#[test]
fn test_config_enabled_tracer_uses_prefix() {
    let config = StackConfig::default().with_trace_prefix("~~");
    let sink = Rc::new(RecordingSink::new());
    let countdown = fix(|this| {
        config
            .tracer_with_sink(sink.clone())
            .apply(Function::unary("down", move |n| match n.as_int()? {
                0 => Ok(Value::Int(0)),
                k => this.call(&[Value::Int(k - 1)]),
            }))
            .expect("unary function is accepted by a tracer")
    });

    countdown.call(&[Value::Int(1)]).unwrap();
    assert_eq!(
        sink.lines(),
        vec![
            " --> down(1)",
            "~~ --> down(0)",
            "~~ <-- down(0) == 0",
            " <-- down(1) == 0",
        ]
    );
}

// ============================================================================
// Error Propagation
// ============================================================================

#[test]
fn test_unhashable_rejected_before_lower_layers() {
    let f = memo(countcalls(Function::variadic("len", |args| {
        Ok(Value::Int(args.len() as i64))
    })));

    let err = f.call(&[Value::List(vec![])]).unwrap_err();
    assert!(matches!(err, TransformError::UnhashableKey { kind: "list", .. }));
    assert_eq!(f.inner().calls(), 0);
}

#[test]
fn test_zero_arguments_through_stack() {
    let f = countcalls(memo(n_ary(add()).unwrap()));
    assert_eq!(
        f.call(&[]),
        Err(TransformError::ArityError { name: "add".into() })
    );
    // counted, but nothing cached
    assert_eq!(f.calls(), 1);
    assert!(f.inner().is_empty());
}

#[test]
fn test_wrap_time_arity_mismatch() {
    let unary = Function::unary("neg", |x| Ok(Value::Int(-x.as_int()?)));
    let err = countcalls(unary).n_ary().unwrap_err();
    assert!(matches!(err, TransformError::ArityMismatch { got: 2, .. }));
}

#[test]
fn test_type_errors_propagate_unchanged() {
    let sink = Rc::new(RecordingSink::new());
    let f = countcalls(
        trace("")
            .with_sink(sink.clone())
            .wrap(memo(n_ary(add()).unwrap())),
    );

    let err = f.call(&[Value::Int(1), Value::from("two")]).unwrap_err();
    assert_eq!(
        err,
        TransformError::TypeMismatch {
            expected: "int",
            got: "str"
        }
    );
    assert_eq!(f.calls(), 1);
    assert_eq!(
        sink.lines()[1],
        " <-- add(1, two) !! type mismatch: expected int, got str"
    );
}

//! App integration tests.
//!
//! These mount views over a live document and drive them through patches,
//! events and frames.

use std::cell::Cell;
use std::rc::Rc;

use serde_json::{json, Value};
use vode::{memo, App, AppOptions, Event, Handler, LiveDocument, Patch, Props, State, Vode, VodeError};
use vode_dom::NodeId;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// A `body` with an empty `div` container.
fn document() -> (LiveDocument, NodeId, NodeId) {
    let mut doc = LiveDocument::new();
    let body = doc.create_element("body");
    let container = doc.create_element("div");
    doc.append_child(body, container).unwrap();
    (doc, body, container)
}

fn mount(state: Value, view: impl Fn(&State) -> Vode + 'static) -> App {
    init_tracing();
    let (doc, _, container) = document();
    App::mount(doc, container, state, view, []).unwrap()
}

fn html(app: &App) -> String {
    app.document().outer_html(app.container())
}

fn int(state: &State, key: &str) -> i64 {
    state[key].as_i64().unwrap_or_default()
}

// =============================================================================
// Reconciliation
// =============================================================================

mod reconciliation {
    use super::*;

    fn counter(state: &State) -> Vode {
        Vode::element("div")
            .child(Vode::element("span").child(int(state, "count").to_string()))
            .into()
    }

    #[test]
    fn counter_reuses_nodes() {
        let mut app = mount(json!({"count": 0}), counter);
        insta::assert_snapshot!(html(&app), @"<div><span>0</span></div>");

        let div = app.container();
        let span = app.vode().and_then(|v| v.child(0)).map(|v| v.node).unwrap();

        app.patch(json!({"count": 1})).unwrap();
        // Nothing renders before the frame.
        insta::assert_snapshot!(html(&app), @"<div><span>0</span></div>");

        app.run_until_stalled().unwrap();
        insta::assert_snapshot!(html(&app), @"<div><span>1</span></div>");
        assert_eq!(app.container(), div);
        assert_eq!(app.vode().and_then(|v| v.child(0)).map(|v| v.node), Some(span));
        assert_eq!(app.stats().sync_render_count, 1);
        assert_eq!(app.stats().patch_count, 1);
    }

    #[test]
    fn root_tag_toggle_rebuilds_children() {
        init_tracing();
        let (mut doc, body, container) = document();
        let header = doc.create_element("header");
        let footer = doc.create_element("footer");
        doc.insert_before(body, header, container).unwrap();
        doc.append_child(body, footer).unwrap();

        let view = |state: &State| -> Vode {
            let tag = if state["section"] == json!(true) { "section" } else { "div" };
            Vode::element(tag).child(Vode::element("span").child("x")).into()
        };
        let mut app = App::mount(doc, container, json!({"section": false}), view, []).unwrap();
        let old_root = app.container();
        let old_span = app.vode().and_then(|v| v.child(0)).map(|v| v.node).unwrap();

        app.patch(json!({"section": true})).unwrap();
        app.run_until_stalled().unwrap();

        assert_ne!(app.container(), old_root);
        assert!(!app.document().contains(old_root));
        assert!(!app.document().contains(old_span));
        insta::assert_snapshot!(
            app.document().inner_html(body),
            @"<header></header><section><span>x</span></section><footer></footer>"
        );

        app.patch(json!({"section": false})).unwrap();
        app.run_until_stalled().unwrap();
        insta::assert_snapshot!(
            app.document().inner_html(body),
            @"<header></header><div><span>x</span></div><footer></footer>"
        );
    }

    #[test]
    fn list_truncation_removes_only_the_tail() {
        let view = |state: &State| -> Vode {
            let items = state["items"].as_array().cloned().unwrap_or_default();
            Vode::element("ul")
                .children(items.iter().map(|i| Vode::element("li").child(i.to_string())))
                .into()
        };
        let mut app = mount(json!({"items": [0, 1, 2]}), view);
        insta::assert_snapshot!(html(&app), @"<ul><li>0</li><li>1</li><li>2</li></ul>");

        let li: Vec<NodeId> = app.vode().unwrap().children().iter().flatten().map(|c| c.node).collect();
        let before = app.document().stats();

        app.patch(json!({"items": [0, 1]})).unwrap();
        app.run_until_stalled().unwrap();

        insta::assert_snapshot!(html(&app), @"<ul><li>0</li><li>1</li></ul>");
        let after: Vec<NodeId> = app.vode().unwrap().children().iter().flatten().map(|c| c.node).collect();
        assert_eq!(after, li[..2]);
        assert!(!app.document().contains(li[2]));

        let stats = app.document().stats();
        assert_eq!(stats.removed - before.removed, 1);
        assert_eq!(stats.created, before.created);
        assert_eq!(stats.text_writes, before.text_writes);
    }

    #[test]
    fn unchanged_render_is_idempotent() {
        let view = |state: &State| -> Vode {
            Vode::element("div")
                .with_props(
                    Props::new()
                        .with("class", json!(["card", {"active": true}]))
                        .with("style", json!({"paddingTop": "4px"}))
                        .with("data-id", 7_i64)
                        .on_patch("click", json!({"clicked": true})),
                )
                .child(Vode::element("h1").child(state["title"].as_str().unwrap_or_default().to_owned()))
                .child(Vode::element("input").with_props(Props::new().with("value", "x").with("disabled", false)))
                .into()
        };
        let mut app = mount(json!({"title": "hi"}), view);
        insta::assert_snapshot!(
            html(&app),
            @r#"<div class="card active" style="padding-top: 4px;" data-id="7"><h1>hi</h1><input value="x"></div>"#
        );

        let before = app.document().stats();
        app.patch(json!({})).unwrap();
        app.run_until_stalled().unwrap();
        assert_eq!(app.stats().sync_render_count, 1);
        assert_eq!(app.document().stats(), before);
    }

    #[test]
    fn inline_closure_listener_is_rewritten() {
        let shared = Handler::new(|_, _| Patch::Ignore);
        let view = move |_: &State| -> Vode {
            Vode::element("div")
                .child(Vode::element("button").with_props(Props::new().on("click", |_, _| Patch::Ignore)))
                .child(Vode::element("button").with_props(Props::new().with("onclick", shared.clone())))
                .into()
        };
        let mut app = mount(json!({}), view);

        let before = app.document().stats();
        app.patch(json!({})).unwrap();
        app.run_until_stalled().unwrap();
        let after = app.document().stats();
        // Only the closure built inside the view is written again.
        assert_eq!(after.listener_writes, before.listener_writes + 1);
        assert_eq!(after.total(), before.total() + 1);
    }

    #[test]
    fn hydrates_server_rendered_markup() {
        init_tracing();
        let (mut doc, body, container) = document();
        doc.set_attribute(container, "class", "app").unwrap();
        let ws = doc.create_text("\n  ");
        let comment = doc.create_comment("ssr");
        let p = doc.create_element("P");
        let text = doc.create_text("ready");
        doc.append_child(p, text).unwrap();
        for child in [ws, comment, p] {
            doc.append_child(container, child).unwrap();
        }
        let created = doc.stats().created;

        let view = |_: &State| -> Vode {
            Vode::element("div")
                .with_props(Props::new().with("class", "app"))
                .child(Vode::element("p").child("ready"))
                .into()
        };
        let app = App::mount(doc, container, json!({}), view, []).unwrap();

        assert_eq!(app.container(), container);
        assert_eq!(app.vode().and_then(|v| v.child(0)).map(|v| v.node), Some(p));
        assert_eq!(app.document().stats().created, created);
        insta::assert_snapshot!(app.document().inner_html(body), @r#"<div class="app"><P>ready</P></div>"#);
    }

    #[test]
    fn mount_rejects_bad_input() {
        let mut doc = LiveDocument::new();
        let detached = doc.create_element("div");
        let err = App::mount(doc, detached, json!({}), |_| Vode::Nothing, []).unwrap_err();
        assert_eq!(err, VodeError::InvalidContainer);

        let (doc, _, container) = document();
        let err = App::mount(doc, container, json!([1, 2]), |_| Vode::Nothing, []).unwrap_err();
        assert_eq!(err, VodeError::InvalidState);
    }
}

// =============================================================================
// Lifecycle Hooks
// =============================================================================

mod lifecycle {
    use super::*;

    #[test]
    fn on_mount_fires_once() {
        let view = |state: &State| -> Vode {
            Vode::element("div")
                .child(
                    Vode::element("span")
                        .with_props(Props::new().on_mount(|state, _| json!({"mounts": int(state, "mounts") + 1}).into()))
                        .child(state["label"].as_str().unwrap_or_default().to_owned()),
                )
                .into()
        };
        let mut app = mount(json!({"label": "a", "mounts": 0}), view);
        app.run_until_stalled().unwrap();
        assert_eq!(app.state()["mounts"], json!(1));

        app.patch(json!({"label": "b"})).unwrap();
        app.run_until_stalled().unwrap();
        insta::assert_snapshot!(html(&app), @"<div><span>b</span></div>");
        assert_eq!(app.state()["mounts"], json!(1));
    }

    #[test]
    fn on_unmount_fires_on_removal() {
        let view = |state: &State| -> Vode {
            let panel = (state["open"] == json!(true)).then(|| {
                Vode::element("aside")
                    .with_props(Props::new().on_unmount(|_, _| json!({"closed": true}).into()))
                    .child("panel")
            });
            Vode::element("div").child(panel).into()
        };
        let mut app = mount(json!({"open": true}), view);
        insta::assert_snapshot!(html(&app), @"<div><aside>panel</aside></div>");

        app.patch(json!({"open": false})).unwrap();
        app.run_until_stalled().unwrap();
        insta::assert_snapshot!(html(&app), @"<div></div>");
        assert_eq!(app.state()["closed"], json!(true));
    }

    #[test]
    fn on_unmount_fires_on_removed_root_only() {
        let view = |state: &State| -> Vode {
            let panel = (state["open"] == json!(true)).then(|| {
                Vode::element("aside")
                    .with_props(Props::new().on_unmount(|_, _| json!({"outer": true}).into()))
                    .child(
                        Vode::element("span")
                            .with_props(Props::new().on_unmount(|_, _| json!({"inner": true}).into()))
                            .child("nested"),
                    )
            });
            Vode::element("div").child(panel).into()
        };
        let mut app = mount(json!({"open": true}), view);

        app.patch(json!({"open": false})).unwrap();
        app.run_until_stalled().unwrap();
        insta::assert_snapshot!(html(&app), @"<div></div>");
        assert_eq!(app.state(), &json!({"open": false, "outer": true}));
    }

    #[test]
    fn hooks_receive_their_node() {
        let seen = Rc::new(Cell::new(0));
        let recorder = seen.clone();
        let view = move |_: &State| -> Vode {
            let recorder = recorder.clone();
            Vode::element("div")
                .child(Vode::element("canvas").with_props(Props::new().on_mount(move |_, node| {
                    recorder.set(node);
                    Patch::Ignore
                })))
                .into()
        };
        let app = mount(json!({}), view);
        let canvas = app.vode().and_then(|v| v.child(0)).map(|v| v.node);
        assert_eq!(Some(seen.get()), canvas);
    }
}

// =============================================================================
// Events
// =============================================================================

mod events {
    use super::*;

    fn view(state: &State) -> Vode {
        Vode::element("div")
            .child(
                Vode::element("button")
                    .with_props(Props::new().on("click", |state, _| json!({"count": int(state, "count") + 1}).into()))
                    .child(int(state, "count").to_string()),
            )
            .child(Vode::element("button").with_props(Props::new().on_patch("click", json!({"count": 0}))))
            .into()
    }

    fn button(app: &App, index: usize) -> NodeId {
        app.vode().and_then(|v| v.child(index)).map(|v| v.node).unwrap()
    }

    #[test]
    fn listener_patches_state() {
        let mut app = mount(json!({"count": 0}), view);
        let increment = button(&app, 0);

        for _ in 0..3 {
            assert!(app.dispatch_event(increment, Event::new("click", increment)).unwrap());
            app.run_until_stalled().unwrap();
        }
        assert_eq!(app.state()["count"], json!(3));
        assert_eq!(app.vode().and_then(|v| v.child(0)).map(|v| v.node), Some(increment));
        insta::assert_snapshot!(html(&app), @"<div><button>3</button><button></button></div>");
    }

    #[test]
    fn literal_listener_patch() {
        let mut app = mount(json!({"count": 5}), view);
        let reset = button(&app, 1);
        app.dispatch_event(reset, Event::new("click", reset)).unwrap();
        app.run_until_stalled().unwrap();
        assert_eq!(app.state()["count"], json!(0));
    }

    #[test]
    fn event_detail_reaches_listener() {
        let view = |state: &State| -> Vode {
            Vode::element("input")
                .with_props(
                    Props::new()
                        .with("value", state["text"].clone())
                        .on("input", |_, event| json!({"text": event.detail.clone()}).into()),
                )
                .into()
        };
        let mut app = mount(json!({"text": ""}), view);
        let input = app.container();
        app.dispatch_event(input, Event::new("input", input).with_detail(json!("hello")))
            .unwrap();
        app.run_until_stalled().unwrap();
        insta::assert_snapshot!(html(&app), @r#"<input value="hello">"#);
        assert_eq!(app.document().property(input, "value"), Some(&json!("hello")));
    }

    #[test]
    fn missing_listener() {
        let mut app = mount(json!({"count": 0}), view);
        let root = app.container();
        assert!(!app.dispatch_event(root, Event::new("click", root)).unwrap());
    }
}

// =============================================================================
// Scheduling
// =============================================================================

mod scheduling {
    use super::*;

    fn pair(state: &State) -> Vode {
        Vode::element("p")
            .child(format!("{}-{}", int(state, "a"), int(state, "b")))
            .into()
    }

    #[test]
    fn patches_during_a_tick_coalesce() {
        let mut app = mount(json!({"a": 0, "b": 0}), pair);
        app.patch(json!({"a": 1})).unwrap();
        app.patch(json!({"b": 2})).unwrap();
        app.patch(json!({"a": 3})).unwrap();
        app.run_until_stalled().unwrap();

        insta::assert_snapshot!(html(&app), @"<p>3-2</p>");
        let stats = app.stats();
        assert_eq!(stats.sync_render_count, 2);
        assert_eq!(stats.sync_render_patch_count, 3);
    }

    #[test]
    fn flush_folds_pending_async_patches() {
        let mut app = mount(json!({"a": 0, "b": 0}), pair);
        app.patch_async(json!({"a": 1})).unwrap();
        app.patch_async(json!({"b": 1})).unwrap();
        assert!(app.current_transition().is_some());
        insta::assert_snapshot!(html(&app), @"<p>0-0</p>");

        app.patch(Patch::flush()).unwrap();
        insta::assert_snapshot!(html(&app), @"<p>1-1</p>");
        assert_eq!(app.stats().sync_render_count, 1);
        assert_eq!(app.current_transition(), None);

        // The scheduled async tick was cancelled, not deferred.
        app.run_until_stalled().unwrap();
        let stats = app.stats();
        assert_eq!(stats.async_render_count, 0);
        assert_eq!(stats.sync_render_count, 1);
        assert_eq!(stats.async_render_patch_count, 2);
        assert_eq!(app.current_transition(), None);
        insta::assert_snapshot!(html(&app), @"<p>1-1</p>");
    }

    #[test]
    fn batch_uses_async_lane() {
        let mut app = mount(json!({"a": 0, "b": 0}), pair);
        app.patch(json!([{"a": 1}, {"b": 1}])).unwrap();
        app.run_until_stalled().unwrap();

        insta::assert_snapshot!(html(&app), @"<p>1-1</p>");
        let stats = app.stats();
        assert_eq!(stats.async_render_patch_count, 2);
        assert_eq!(stats.async_render_count, 2);
        assert_eq!(stats.sync_render_count, 0);
    }

    #[test]
    fn batch_uses_sync_lane_when_hidden() {
        let mut app = mount(json!({"a": 0, "b": 0}), pair);
        app.set_hidden(true);
        app.patch(json!([{"a": 1}, {"b": 1}])).unwrap();
        app.run_until_stalled().unwrap();

        let stats = app.stats();
        assert_eq!(stats.async_render_patch_count, 0);
        assert_eq!(stats.sync_render_patch_count, 2);
        insta::assert_snapshot!(html(&app), @"<p>1-1</p>");
    }

    #[test]
    fn async_lane_without_transitions() {
        init_tracing();
        let (doc, _, container) = document();
        let options = AppOptions::from_json(r#"{"viewTransitions": false}"#).unwrap();
        let mut app = App::mount_with_options(doc, container, json!({"a": 0, "b": 0}), pair, [], options).unwrap();
        app.patch_async(json!({"a": 4})).unwrap();
        assert_eq!(app.current_transition(), None);
        app.run_until_stalled().unwrap();
        insta::assert_snapshot!(html(&app), @"<p>4-0</p>");
        assert_eq!(app.stats().async_render_count, 1);
    }

    #[test]
    fn null_deletes_state_keys() {
        let mut app = mount(json!({"x": 1, "keep": {"y": 2, "z": 3}}), |_| Vode::element("div").into());
        app.patch(json!({"x": null, "keep": {"z": null}})).unwrap();
        app.run_until_stalled().unwrap();
        assert_eq!(app.state(), &json!({"keep": {"y": 2}}));
    }

    #[test]
    fn initial_patches_apply_in_order() {
        init_tracing();
        let (doc, _, container) = document();
        let initial = [Patch::from(json!({"a": 1})), Patch::action(|s| json!({"b": int(s, "a") + 1}).into())];
        let mut app = App::mount(doc, container, json!({"a": 0, "b": 0}), pair, initial).unwrap();
        app.run_until_stalled().unwrap();
        insta::assert_snapshot!(html(&app), @"<p>1-2</p>");
    }

    #[test]
    fn ignored_patches_are_not_counted() {
        let mut app = mount(json!({}), pair);
        app.patch(Value::Null).unwrap();
        app.patch(json!(42)).unwrap();
        assert_eq!(app.stats().patch_count, 0);
        assert_eq!(app.stats(), Default::default());
    }
}

// =============================================================================
// Memoization
// =============================================================================

mod memoization {
    use super::*;

    #[test]
    fn memo_skips_unchanged_components() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let view = move |state: &State| -> Vode {
            let counter = counter.clone();
            Vode::element("div")
                .child(memo([state["a"].clone()], move |state| {
                    counter.set(counter.get() + 1);
                    Vode::element("b").child(int(state, "a").to_string()).into()
                }))
                .child(int(state, "other").to_string())
                .into()
        };
        let mut app = mount(json!({"a": 1, "other": 0}), view);
        assert_eq!(calls.get(), 1);

        app.patch(json!({"other": 1})).unwrap();
        app.run_until_stalled().unwrap();
        assert_eq!(calls.get(), 1);
        insta::assert_snapshot!(html(&app), @"<div><b>1</b>1</div>");

        app.patch(json!({"a": 2})).unwrap();
        app.run_until_stalled().unwrap();
        assert_eq!(calls.get(), 2);
        insta::assert_snapshot!(html(&app), @"<div><b>2</b>1</div>");
    }
}

// =============================================================================
// Effects
// =============================================================================

mod effects {
    use super::*;
    use futures::channel::oneshot;
    use futures::stream;

    #[test]
    fn future_resolves_into_patch() {
        let mut app = mount(json!({"loaded": false}), |s| Vode::element("p").child(s["loaded"].to_string()).into());
        let (tx, rx) = oneshot::channel::<Value>();
        app.patch(Patch::future(async move { rx.await.map(Patch::from).unwrap_or_default() }))
            .unwrap();

        app.run_until_stalled().unwrap();
        assert_eq!(app.stats().live_effect_count, 1);
        insta::assert_snapshot!(html(&app), @"<p>false</p>");

        tx.send(json!({"loaded": true})).unwrap();
        app.run_until_stalled().unwrap();
        assert_eq!(app.stats().live_effect_count, 0);
        insta::assert_snapshot!(html(&app), @"<p>true</p>");
    }

    #[test]
    fn stream_items_apply_in_order() {
        let mut app = mount(json!({}), |s| Vode::element("i").child(int(s, "step").to_string()).into());
        let items = (1..=3).map(|step| Patch::from(json!({"step": step, (format!("seen{step}")): true})));
        app.patch(Patch::stream(stream::iter(items))).unwrap();
        app.run_until_stalled().unwrap();

        assert_eq!(app.state(), &json!({"step": 3, "seen1": true, "seen2": true, "seen3": true}));
        assert_eq!(app.stats().patch_count, 4);
        assert_eq!(app.stats().live_effect_count, 0);
        insta::assert_snapshot!(html(&app), @"<i>3</i>");
    }

    #[test]
    fn task_emits_then_returns() {
        let mut app = mount(json!({}), |_| Vode::element("div").into());
        app.patch(Patch::task(|y| async move {
            y.emit(json!({"progress": 50})).await;
            y.emit(json!({"progress": 100})).await;
            Patch::from(json!({"done": true}))
        }))
        .unwrap();
        app.run_until_stalled().unwrap();
        assert_eq!(app.state(), &json!({"progress": 100, "done": true}));
    }

    #[test]
    fn dispatch_handle_feeds_the_app() {
        let mut app = mount(json!({"n": 0}), |s| Vode::element("i").child(int(s, "n").to_string()).into());
        let dispatch = app.dispatch();
        dispatch.patch(json!({"n": 1}));
        dispatch.patch_async(json!({"n": 2}));
        app.run_until_stalled().unwrap();
        insta::assert_snapshot!(html(&app), @"<i>2</i>");
    }

    #[test]
    fn action_sees_current_state() {
        let mut app = mount(json!({"n": 2}), |_| Vode::element("div").into());
        app.patch(Patch::action(|s| json!({"n": int(s, "n") * 10}).into())).unwrap();
        assert_eq!(app.state()["n"], json!(20));
    }
}

// =============================================================================
// Errors
// =============================================================================

mod errors {
    use super::*;

    fn guarded(state: &State) -> Vode {
        let fail = state["fail"] == json!(true);
        Vode::element("div")
            .child(
                Vode::element("section")
                    .with_props(Props::new().catch(Vode::element("em").child("fallback")))
                    .child(Vode::try_component(move |_| {
                        if fail {
                            Err(VodeError::render("broken widget"))
                        } else {
                            Ok(Vode::text("widget"))
                        }
                    })),
            )
            .child("sibling")
            .into()
    }

    #[test]
    fn catch_recovers_subtree() {
        let mut app = mount(json!({"fail": false}), guarded);
        insta::assert_snapshot!(html(&app), @"<div><section>widget</section>sibling</div>");

        app.patch(json!({"fail": true})).unwrap();
        app.run_until_stalled().unwrap();
        insta::assert_snapshot!(html(&app), @"<div><em>fallback</em>sibling</div>");

        app.patch(json!({"fail": false})).unwrap();
        app.run_until_stalled().unwrap();
        insta::assert_snapshot!(html(&app), @"<div><section>widget</section>sibling</div>");
    }

    #[test]
    fn catch_on_memoized_props() {
        let view = |state: &State| -> Vode {
            let fail = state["fail"] == json!(true);
            Vode::element("div")
                .child(
                    Vode::element("section")
                        .with_memo_props(["guard"], |_| {
                            Props::new().with("class", "guard").catch(Vode::element("em").child("fallback"))
                        })
                        .child(Vode::try_component(move |_| {
                            if fail {
                                Err(VodeError::render("broken widget"))
                            } else {
                                Ok(Vode::text("widget"))
                            }
                        })),
                )
                .into()
        };
        let mut app = mount(json!({"fail": false}), view);
        insta::assert_snapshot!(html(&app), @r#"<div><section class="guard">widget</section></div>"#);

        app.patch(json!({"fail": true})).unwrap();
        app.run_until_stalled().unwrap();
        insta::assert_snapshot!(html(&app), @"<div><em>fallback</em></div>");
    }

    #[test]
    fn uncaught_error_aborts_tick_only() {
        let view = |state: &State| -> Vode {
            let fail = state["fail"] == json!(true);
            Vode::try_component(move |_| {
                if fail {
                    Err(VodeError::render("no"))
                } else {
                    Ok(Vode::element("div").child("ok").into())
                }
            })
        };
        let mut app = mount(json!({"fail": false}), view);

        app.patch(json!({"fail": true})).unwrap();
        let err = app.run_until_stalled().unwrap_err();
        assert_eq!(err, VodeError::Render("no".into()));
        insta::assert_snapshot!(html(&app), @"<div>ok</div>");

        app.patch(json!({"fail": false})).unwrap();
        app.run_until_stalled().unwrap();
        insta::assert_snapshot!(html(&app), @"<div>ok</div>");
        assert_eq!(app.stats().sync_render_count, 2);
    }
}

// =============================================================================
// Teardown
// =============================================================================

mod teardown {
    use super::*;

    #[test]
    fn defuse_removes_listeners_and_stops_rendering() {
        let view = |_: &State| -> Vode {
            Vode::element("div")
                .child(Vode::element("button").with_props(Props::new().on_patch("click", json!({"x": 1}))))
                .into()
        };
        let mut app = mount(json!({}), view);
        let button = app.vode().and_then(|v| v.child(0)).map(|v| v.node).unwrap();
        assert!(!app.document().listener_names(button).is_empty());

        app.defuse();
        assert!(app.is_defused());
        assert!(app.document().listener_names(button).is_empty());
        assert_eq!(app.patch(json!({"x": 2})), Err(VodeError::Defused));
        assert_eq!(app.dispatch_event(button, Event::new("click", button)), Err(VodeError::Defused));
        assert_eq!(app.run_until_stalled(), Err(VodeError::Defused));
        insta::assert_snapshot!(html(&app), @"<div><button></button></div>");
    }

    #[test]
    fn defuse_closes_dispatch_and_drops_effects() {
        let mut app = mount(json!({"n": 0}), |s| Vode::element("i").child(int(s, "n").to_string()).into());
        let dispatch = app.dispatch();
        let held = Rc::new(());
        let guard = held.clone();
        app.patch(Patch::future(async move {
            let _guard = guard;
            futures::future::pending::<()>().await;
            Patch::default()
        }))
        .unwrap();
        app.run_until_stalled().unwrap();
        assert_eq!(Rc::strong_count(&held), 2);
        assert_eq!(app.stats().live_effect_count, 1);

        app.defuse();
        assert!(dispatch.is_closed());
        assert_eq!(Rc::strong_count(&held), 1);
        assert_eq!(app.stats().live_effect_count, 0);

        dispatch.patch(json!({"n": 1}));
        assert_eq!(app.state(), &json!({"n": 0}));
        insta::assert_snapshot!(html(&app), @"<i>0</i>");
    }
}

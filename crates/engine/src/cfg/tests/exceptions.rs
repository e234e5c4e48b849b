use super::{edge, find, single};
use ir::ControlLabel;

#[test]
fn try_catch_finally_wiring() {
    let cfg = single(
        r#"
class T {
  int m(String s) {
    int v = 0;
    try {
      v = Integer.parseInt(s);
    } catch (NumberFormatException e) {
      v = -1;
    } finally {
      log(v);
    }
    return v;
  }
}
"#,
    );
    let parse = find(&cfg, "v = Integer.parseInt(s);");
    let catch = find(&cfg, "catch (NumberFormatException e)");
    let recover = find(&cfg, "v = -1;");
    let end_try = find(&cfg, "end-try");
    let end_catch = find(&cfg, "end-catch");
    let fin = find(&cfg, "finally");
    let log = find(&cfg, "log(v);");
    let end_finally = find(&cfg, "end-finally");
    assert_eq!(edge(&cfg, find(&cfg, "try"), parse), Some(ControlLabel::Epsilon));
    assert_eq!(edge(&cfg, parse, catch), Some(ControlLabel::Epsilon));
    assert_eq!(edge(&cfg, parse, end_try), Some(ControlLabel::Epsilon));
    assert_eq!(edge(&cfg, catch, recover), Some(ControlLabel::Epsilon));
    assert_eq!(edge(&cfg, recover, end_catch), Some(ControlLabel::Epsilon));
    assert_eq!(edge(&cfg, end_catch, end_try), Some(ControlLabel::Epsilon));
    assert_eq!(edge(&cfg, end_try, fin), Some(ControlLabel::Epsilon));
    assert_eq!(edge(&cfg, fin, log), Some(ControlLabel::Epsilon));
    assert_eq!(edge(&cfg, log, end_finally), Some(ControlLabel::Epsilon));
    assert_eq!(edge(&cfg, end_finally, find(&cfg, "return v;")), Some(ControlLabel::Epsilon));
    // Nodes of the catch block are not wired to the handler.
    assert_eq!(edge(&cfg, recover, catch), None);
}

#[test]
fn return_inside_try_is_routed_through_finally() {
    let cfg = single(
        r#"
class T {
  int m() {
    try {
      return 1;
    } finally {
      cleanup();
    }
  }
}
"#,
    );
    let ret = find(&cfg, "return 1;");
    let fin = find(&cfg, "finally");
    assert_eq!(edge(&cfg, ret, fin), Some(ControlLabel::Epsilon));
    assert_eq!(cfg.out_degree(ret), 1);
}

#[test]
fn throw_has_no_successor_without_handler() {
    let cfg = single("class T { void m() { throw new IllegalStateException(); } }");
    let throw = find(&cfg, "throw new");
    assert_eq!(cfg.out_degree(throw), 0);
}

#[test]
fn resources_are_chained_after_try() {
    let cfg = single(
        r#"
class T {
  void m(String p) {
    try (Reader r = open(p); Writer w = sink()) {
      copy(r, w);
    }
  }
}
"#,
    );
    let reader = find(&cfg, "Reader r = open(p)");
    let writer = find(&cfg, "Writer w = sink()");
    assert_eq!(edge(&cfg, find(&cfg, "try"), reader), Some(ControlLabel::Epsilon));
    assert_eq!(edge(&cfg, reader, writer), Some(ControlLabel::Epsilon));
    assert_eq!(edge(&cfg, writer, find(&cfg, "copy(r, w);")), Some(ControlLabel::Epsilon));
}

#[test]
fn nested_try_leaves_caught_nodes_to_the_inner_handler() {
    let cfg = single(
        r#"
class T {
  void m() {
    try {
      try {
        read();
      } catch (IOException e) {
        retry();
      }
      close();
    } catch (Exception e) {
      fail();
    }
  }
}
"#,
    );
    let read = find(&cfg, "read();");
    let inner = find(&cfg, "catch (IOException e)");
    let retry = find(&cfg, "retry();");
    let close = find(&cfg, "close();");
    let outer = find(&cfg, "catch (Exception e)");
    let fail = find(&cfg, "fail();");
    assert_eq!(edge(&cfg, read, inner), Some(ControlLabel::Epsilon));
    assert_eq!(edge(&cfg, read, outer), None);
    assert_eq!(edge(&cfg, inner, outer), Some(ControlLabel::Epsilon));
    assert_eq!(edge(&cfg, retry, outer), Some(ControlLabel::Epsilon));
    assert_eq!(edge(&cfg, close, outer), Some(ControlLabel::Epsilon));
    assert_eq!(edge(&cfg, fail, outer), None);
    assert_eq!(edge(&cfg, retry, inner), None);
}

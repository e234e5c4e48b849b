use super::*;


pub(crate) fn parse_snippet(code: &str) -> JavaUnit {
    parse_java(code, "<mem>").unwrap()
}

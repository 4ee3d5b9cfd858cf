use insta::assert_snapshot;
use extlatency::latency::{Descriptions, ParseError, parse};

fn parse_error(line: &str) -> ParseError {
    parse(line, &Descriptions::builtin()).unwrap_err()
}

#[test]
fn display_format_mismatch() {
    let err = parse_error("GET /orders HTTP/1.1 200");
    assert_snapshot!(err.to_string(), @"line is not an ExtLatency log: GET /orders HTTP/1.1 200");
}

#[test]
fn display_malformed_token() {
    let err = parse_error("ExtLatency: TS=0,XSL=fast,TC=2 [/]");
    assert_snapshot!(err.to_string(), @"malformed token 'XSL=fast' for keyword 'XSL'");
}

#[test]
fn display_missing_transaction_bounds() {
    let err = parse_error("ExtLatency: HR=0,BS=2 [/]");
    assert_snapshot!(err.to_string(), @"log does not start with TS and end with TC");
    assert!(err.styled().contains("Found HR at the start and BS at the end"));
}

#[test]
fn display_multiple_transactions() {
    let err = parse_error("ExtLatency: TS=0,A=1,TC=2,TS=3,TC=4 [/]");
    assert_snapshot!(err.to_string(), @"log contains more than one transaction, TC found at index 2");
}

#[test]
fn display_unbalanced_processing_rules() {
    let err = parse_error("ExtLatency: TS=0,PS=1 == PC=2,TC=3 [/]");
    assert_snapshot!(err.to_string(), @"unbalanced processing rules at index 1");
    assert!(err.styled().contains("within the same side"));
}

#[test]
fn display_nesting_too_deep() {
    let err = ParseError::NestingTooDeep {
        index: 65,
        limit: 64,
    };
    assert_snapshot!(err.to_string(), @"processing rules nested deeper than 64 at index 65");
    assert!(err.styled().contains("Raise max-depth"));
}

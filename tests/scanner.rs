#[cfg(test)]
mod scanner_tests {
    use rox::error::LoxError;
    use rox::scanner::*;
    use rox::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source);
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_two_char_operators() {
        assert_token_sequence(
            "! != = == < <= > >=",
            &[
                (TokenType::BANG, "!"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL, "="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS, "<"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER, ">"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_keywords_are_case_sensitive() {
        assert_token_sequence(
            "func Func class var_ while",
            &[
                (TokenType::FUNC, "func"),
                (TokenType::IDENTIFIER, "Func"),
                (TokenType::CLASS, "class"),
                (TokenType::IDENTIFIER, "var_"),
                (TokenType::WHILE, "while"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_04_literals_are_decoded() {
        let tokens = scan("12.5 7 \"hi there\" 3.").expect("valid source");

        assert!(matches!(tokens[0].token_type, TokenType::NUMBER(n) if n == 12.5));
        assert!(matches!(tokens[1].token_type, TokenType::NUMBER(n) if n == 7.0));
        assert!(matches!(&tokens[2].token_type, TokenType::STRING(s) if s == "hi there"));
        assert_eq!(tokens[2].lexeme, "\"hi there\"");

        // A trailing dot is not part of the number.
        assert!(matches!(tokens[3].token_type, TokenType::NUMBER(n) if n == 3.0));
        assert_eq!(tokens[4].token_type, TokenType::DOT);
    }

    #[test]
    fn test_scanner_05_comments_and_lines() {
        let source = "a // line comment\n/* block\ncomment */ b\n\"multi\nline\" c";
        let tokens = scan(source).expect("valid source");

        let lines: Vec<(String, usize)> = tokens
            .iter()
            .map(|t| (t.lexeme.clone(), t.line))
            .collect();

        assert_eq!(
            lines,
            vec![
                ("a".to_string(), 1),
                ("b".to_string(), 3),
                ("\"multi\nline\"".to_string(), 5),
                ("c".to_string(), 5),
                ("".to_string(), 5),
            ]
        );
    }

    #[test]
    fn test_scanner_06_round_trip_lexemes() {
        let source = "var x = 10; /* note */ if (x >= 3) { print \"big\"; } // done";
        let tokens = scan(source).expect("valid source");

        let rebuilt: String = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        let stripped: String = "var x = 10;  if (x >= 3) { print \"big\"; } "
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        assert_eq!(rebuilt, stripped);
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let source = ",.$(#";
        let scanner = Scanner::new(source);

        let results: Vec<_> = scanner.collect();

        // 0: COMMA, 1: DOT, 2: error '$', 3: LEFT_PAREN, 4: error '#', 5: EOF
        assert_eq!(results.len(), 6, "Expected 6 items in result");

        assert_token_matches(&results[0], TokenType::COMMA, ",");
        assert_token_matches(&results[1], TokenType::DOT, ".");
        assert_token_matches(&results[3], TokenType::LEFT_PAREN, "(");
        assert_token_matches(&results[5], TokenType::EOF, "");

        let errors: Vec<String> = results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .map(ToString::to_string)
            .collect();

        assert_eq!(
            errors,
            vec![
                "[line 1] Error: Unexpected character: $".to_string(),
                "[line 1] Error: Unexpected character: #".to_string(),
            ]
        );

        fn assert_token_matches(
            result: &Result<Token, LoxError>,
            expected_type: TokenType,
            expected_lexeme: &str,
        ) {
            match result {
                Ok(token) => {
                    assert_eq!(token.token_type, expected_type);
                    assert_eq!(token.lexeme, expected_lexeme);
                }
                Err(e) => panic!("Expected token but got error: {}", e),
            }
        }
    }

    #[test]
    fn test_non_ascii_character_is_one_error() {
        let errors = scan("a é b").unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "[line 1] Error: Unexpected character: é");
    }

    #[test]
    fn test_unterminated_string_and_comment() {
        let errors = scan("\"open\nstring").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "[line 2] Error: Unterminated string.");

        let errors = scan("x /* never\nclosed").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "[line 2] Error: Unterminated block comment."
        );
    }

    #[test]
    fn test_scanning_continues_after_errors() {
        let results: Vec<_> = Scanner::new("@ 1 @ 2").collect();

        let numbers = results
            .iter()
            .filter(|r| matches!(r, Ok(t) if t.token_type == TokenType::NUMBER(0.0)))
            .count();
        let errors = results.iter().filter(|r| r.is_err()).count();

        assert_eq!(numbers, 2);
        assert_eq!(errors, 2);
        assert!(matches!(results.last(), Some(Ok(t)) if t.token_type == TokenType::EOF));
    }

    #[test]
    fn test_token_display() {
        let tokens = scan("42 4.5 \"s\" and").expect("valid source");
        let shown: Vec<String> = tokens.iter().map(ToString::to_string).collect();

        assert_eq!(
            shown,
            vec![
                "NUMBER 42 42.0",
                "NUMBER 4.5 4.5",
                "STRING \"s\" s",
                "AND and null",
                "EOF  null",
            ]
        );
    }
}

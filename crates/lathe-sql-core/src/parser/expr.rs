//! Value expression parsing by precedence climbing.

use crate::ast::{
    ArrayIndexExpression, ArraySliceExpression, BetweenExpression, BinaryExpression,
    CaseExpression, CaseKeyValuePair, CastExpression, CastForm, ColumnReference, FunctionArguments,
    FunctionCall, LiteralValue, OrderByItem, OrderDirection, OverClause, ParameterExpression,
    QualifiedName, StringSpecifierExpression, SwitchCaseArgument, TrimSide, TypeValue,
    UnaryExpression, ValueExpr, WindowFrameBoundary, WindowFrameSpec, WindowFrameUnit, NullsOrder,
};
use crate::lexer::{is_type_constructor, LexemeKind};

use super::error::ParseError;
use super::Parser;

/// Binding power of the `::` cast postfix.
const CAST_BP: u8 = 100;
/// Binding power of array subscripts; always binds.
const SUBSCRIPT_BP: u8 = 250;
/// Operand binding power for arithmetic unary prefixes.
const UNARY_BP: u8 = 200;
/// Operand binding power for logical NOT (comparison level).
const NOT_BP: u8 = 20;
/// Operand binding power for BETWEEN bounds: strictly above BETWEEN
/// itself, so the trailing AND belongs to the BETWEEN.
const BETWEEN_OPERAND_BP: u8 = 32;

/// Left/right binding powers for infix operators. Left-associative
/// operators use `(p, p + 1)`.
fn binary_binding_power(op: &str) -> Option<(u8, u8)> {
    let bp = match op {
        "or" => (2, 3),
        "and" => (4, 5),
        "=" | "<" | ">" | "<=" | ">=" | "<>" | "!=" | "like" | "not like" | "ilike"
        | "not ilike" | "in" | "not in" | "is" | "is not" | "is distinct from"
        | "is not distinct from" | "similar to" | "not similar to" | "~" | "~*" | "!~" | "!~*"
        | "@>" | "<@" | "->" | "->>" | "#>" | "#>>" | "?|" | "?&" | "&&" | "<->" | "<<" | ">>"
        | "&" | "|" | "#" => (20, 21),
        "between" | "not between" => (30, 31),
        "+" | "-" | "||" => (40, 41),
        "*" | "/" | "%" => (60, 61),
        "^" => (80, 81),
        _ => return None,
    };
    Some(bp)
}

impl Parser<'_> {
    /// Parses a value expression at the lowest precedence.
    pub fn parse_value_expr(&mut self) -> Result<ValueExpr, ParseError> {
        self.parse_expr_bp(0)
    }

    pub(crate) fn parse_expr_bp(&mut self, min_bp: u8) -> Result<ValueExpr, ParseError> {
        let mut left = self.parse_prefix()?;

        loop {
            // Postfix: array subscripts bind tightest.
            if self.check_kind(LexemeKind::OPEN_BRACKET) && SUBSCRIPT_BP >= min_bp {
                left = self.parse_subscript(left)?;
                continue;
            }
            // Postfix: `::` cast, right operand is a type.
            if self.check_operator("::") && CAST_BP >= min_bp {
                self.advance();
                let target = self.parse_type_value()?;
                left = ValueExpr::Cast(Box::new(CastExpression {
                    expr: left,
                    target,
                    form: CastForm::Shorthand,
                }));
                continue;
            }

            let Some(op) = self.peek_binary_operator() else {
                break;
            };
            let Some((lbp, rbp)) = binary_binding_power(&op) else {
                break;
            };
            if lbp < min_bp {
                break;
            }
            self.advance();

            left = if op == "between" || op == "not between" {
                let lower = self.parse_expr_bp(BETWEEN_OPERAND_BP)?;
                if !self.eat_operator("and") {
                    return Err(self.unexpected("AND in BETWEEN"));
                }
                let upper = self.parse_expr_bp(BETWEEN_OPERAND_BP)?;
                ValueExpr::Between(Box::new(BetweenExpression {
                    expr: left,
                    lower,
                    upper,
                    negated: op == "not between",
                }))
            } else if op == "in" || op == "not in" {
                let right = self.parse_in_operand()?;
                ValueExpr::Binary(Box::new(BinaryExpression {
                    left,
                    operator: op,
                    right,
                }))
            } else {
                let right = self.parse_expr_bp(rbp)?;
                ValueExpr::Binary(Box::new(BinaryExpression {
                    left,
                    operator: op,
                    right,
                }))
            };
        }

        Ok(left)
    }

    fn peek_binary_operator(&self) -> Option<String> {
        let lexeme = self.peek()?;
        if !lexeme.is(LexemeKind::OPERATOR) {
            return None;
        }
        binary_binding_power(&lexeme.value).map(|_| lexeme.value.clone())
    }

    fn parse_prefix(&mut self) -> Result<ValueExpr, ParseError> {
        let Some(lexeme) = self.peek() else {
            return Err(self.unexpected("a value expression"));
        };
        let kind = lexeme.kind;
        let value = lexeme.value.clone();

        if kind.contains(LexemeKind::LITERAL) {
            self.advance();
            return Ok(ValueExpr::Literal(literal_from_text(&value)));
        }

        if kind.contains(LexemeKind::STRING_SPECIFIER) {
            self.advance();
            let split = value.find('\'').unwrap_or(0);
            return Ok(ValueExpr::StringSpecifier(StringSpecifierExpression {
                specifier: value[..split].to_string(),
                payload: value[split..].to_string(),
            }));
        }

        if kind.contains(LexemeKind::PARAMETER) {
            self.advance();
            return Ok(ValueExpr::Parameter(ParameterExpression::new(
                parameter_name(&value),
            )));
        }

        if kind.contains(LexemeKind::OPEN_PAREN) {
            return self.parse_paren_or_subquery();
        }

        if kind.contains(LexemeKind::OPERATOR) {
            let op = value.clone();
            if op == "-" || op == "+" {
                self.advance();
                let expr = self.parse_expr_bp(UNARY_BP)?;
                return Ok(ValueExpr::Unary(UnaryExpression {
                    operator: op,
                    expr: Box::new(expr),
                }));
            }
            if op == "not" {
                self.advance();
                let expr = self.parse_expr_bp(NOT_BP)?;
                return Ok(ValueExpr::Unary(UnaryExpression {
                    operator: op,
                    expr: Box::new(expr),
                }));
            }
            if op == "exists" || op == "not exists" {
                self.advance();
                self.expect_open_paren()?;
                let query = self.parse_select_query()?;
                self.expect_close_paren()?;
                return Ok(ValueExpr::Unary(UnaryExpression {
                    operator: op,
                    expr: Box::new(ValueExpr::InlineQuery(Box::new(query))),
                }));
            }
            if op == "*" {
                self.advance();
                if self.check_kind(LexemeKind::DOT) {
                    return Err(ParseError::WildcardMisuse {
                        span: self.span_here(),
                        nearby: self.nearby(),
                    });
                }
                // A bare wildcard is never an operand: no casts,
                // subscripts, or binary operators may follow it.
                let extends = self.check_operator("::")
                    || self.check_kind(LexemeKind::OPEN_BRACKET)
                    || self.peek().is_some_and(|l| {
                        l.is(LexemeKind::OPERATOR)
                            && binary_binding_power(&l.value).is_some()
                    });
                if extends {
                    return Err(ParseError::WildcardMisuse {
                        span: self.span_here(),
                        nearby: self.nearby(),
                    });
                }
                return Ok(ValueExpr::Column(ColumnReference::new("*")));
            }
            return Err(self.unexpected("a value expression"));
        }

        if kind.contains(LexemeKind::COMMAND) {
            match value.as_str() {
                "case" => return self.parse_case_expression(),
                "cast" => return self.parse_cast_expression(),
                "default" => {
                    self.advance();
                    return Ok(ValueExpr::RawString("default".to_string()));
                }
                "substring" | "overlay" | "trim" | "position"
                    if self.peek_at(1).is_some_and(|l| l.is(LexemeKind::OPEN_PAREN)) =>
                {
                    return self.parse_special_function();
                }
                _ => {}
            }
        }

        if self.check_identifier() {
            return self.parse_identifier_expression();
        }

        Err(self.unexpected("a value expression"))
    }

    fn parse_subscript(&mut self, array: ValueExpr) -> Result<ValueExpr, ParseError> {
        self.advance();
        // Leading `:` means a slice with an open lower bound.
        if self.eat_operator(":") {
            let to = if self.check_kind(LexemeKind::CLOSE_BRACKET) {
                None
            } else {
                Some(self.parse_value_expr()?)
            };
            self.expect_close_bracket()?;
            return Ok(ValueExpr::ArraySlice(Box::new(ArraySliceExpression {
                array,
                from: None,
                to,
            })));
        }
        let first = self.parse_value_expr()?;
        if self.eat_operator(":") {
            let to = if self.check_kind(LexemeKind::CLOSE_BRACKET) {
                None
            } else {
                Some(self.parse_value_expr()?)
            };
            self.expect_close_bracket()?;
            return Ok(ValueExpr::ArraySlice(Box::new(ArraySliceExpression {
                array,
                from: Some(first),
                to,
            })));
        }
        self.expect_close_bracket()?;
        Ok(ValueExpr::ArrayIndex(Box::new(ArrayIndexExpression {
            array,
            index: first,
        })))
    }

    fn expect_close_bracket(&mut self) -> Result<(), ParseError> {
        if self.eat_kind(LexemeKind::CLOSE_BRACKET) {
            Ok(())
        } else {
            Err(self.unexpected("]"))
        }
    }

    fn parse_paren_or_subquery(&mut self) -> Result<ValueExpr, ParseError> {
        self.advance();
        if self.starts_select() {
            let query = self.parse_select_query()?;
            self.expect_close_paren()?;
            return Ok(ValueExpr::InlineQuery(Box::new(query)));
        }
        let first = self.parse_value_expr()?;
        if self.check_kind(LexemeKind::COMMA) {
            let mut items = vec![first];
            while self.eat_kind(LexemeKind::COMMA) {
                items.push(self.parse_value_expr()?);
            }
            self.reject_bare_wildcards(&items)?;
            self.expect_close_paren()?;
            return Ok(ValueExpr::Tuple(items));
        }
        if is_bare_wildcard(&first) {
            return Err(ParseError::WildcardMisuse {
                span: self.span_here(),
                nearby: self.nearby(),
            });
        }
        self.expect_close_paren()?;
        Ok(ValueExpr::Paren(Box::new(first)))
    }

    pub(crate) fn starts_select(&self) -> bool {
        self.check_command("select") || self.check_command("with") || self.check_command("values")
    }

    fn parse_in_operand(&mut self) -> Result<ValueExpr, ParseError> {
        self.expect_open_paren()?;
        if self.starts_select() {
            let query = self.parse_select_query()?;
            self.expect_close_paren()?;
            return Ok(ValueExpr::InlineQuery(Box::new(query)));
        }
        let mut items = vec![self.parse_value_expr()?];
        while self.eat_kind(LexemeKind::COMMA) {
            items.push(self.parse_value_expr()?);
        }
        self.reject_bare_wildcards(&items)?;
        self.expect_close_paren()?;
        Ok(ValueExpr::ValueList(items))
    }

    /// Rejects a bare `*` anywhere in a list context; a wildcard is
    /// only legal as the sole argument of a function call.
    fn reject_bare_wildcards(&self, items: &[ValueExpr]) -> Result<(), ParseError> {
        if items.iter().any(is_bare_wildcard) {
            return Err(ParseError::WildcardMisuse {
                span: self.span_here(),
                nearby: self.nearby(),
            });
        }
        Ok(())
    }

    fn parse_case_expression(&mut self) -> Result<ValueExpr, ParseError> {
        self.expect_command("case")?;
        let operand = if self.check_command("when") {
            None
        } else {
            Some(self.parse_value_expr()?)
        };
        let mut pairs = Vec::new();
        while self.eat_command("when") {
            let key = self.parse_value_expr()?;
            self.expect_command("then")?;
            let value = self.parse_value_expr()?;
            pairs.push(CaseKeyValuePair { key, value });
        }
        if pairs.is_empty() {
            return Err(self.unexpected("WHEN"));
        }
        let else_value = if self.eat_command("else") {
            Some(self.parse_value_expr()?)
        } else {
            None
        };
        self.expect_command("end")?;
        Ok(ValueExpr::Case(Box::new(CaseExpression {
            operand,
            switch: SwitchCaseArgument { pairs, else_value },
        })))
    }

    fn parse_cast_expression(&mut self) -> Result<ValueExpr, ParseError> {
        self.expect_command("cast")?;
        self.expect_open_paren()?;
        let expr = self.parse_value_expr()?;
        self.expect_command("as")?;
        let target = self.parse_type_value()?;
        self.expect_close_paren()?;
        Ok(ValueExpr::Cast(Box::new(CastExpression {
            expr,
            target,
            form: CastForm::Standard,
        })))
    }

    /// SUBSTRING/OVERLAY/TRIM/POSITION keyworded forms.
    fn parse_special_function(&mut self) -> Result<ValueExpr, ParseError> {
        let name = self.peek().map(|l| l.value.clone()).unwrap_or_default();
        self.advance();
        self.expect_open_paren()?;
        let args = match name.as_str() {
            "substring" => self.parse_substring_args()?,
            "overlay" => self.parse_overlay_args()?,
            "trim" => self.parse_trim_args()?,
            "position" => self.parse_position_args()?,
            _ => unreachable!("caller checks the name"),
        };
        self.expect_close_paren()?;
        let mut call = FunctionCall::new(name, Vec::new());
        call.args = args;
        Ok(ValueExpr::Function(Box::new(call)))
    }

    fn parse_substring_args(&mut self) -> Result<FunctionArguments, ParseError> {
        let input = self.parse_value_expr()?;
        if self.check_kind(LexemeKind::COMMA) {
            let mut args = vec![input];
            while self.eat_kind(LexemeKind::COMMA) {
                args.push(self.parse_value_expr()?);
            }
            return Ok(FunctionArguments::List(args));
        }
        let from = if self.eat_command("from") {
            Some(self.parse_value_expr()?)
        } else {
            None
        };
        let for_count = if self.eat_command("for") {
            Some(self.parse_value_expr()?)
        } else {
            None
        };
        Ok(FunctionArguments::Substring {
            input,
            from,
            for_count,
        })
    }

    fn parse_overlay_args(&mut self) -> Result<FunctionArguments, ParseError> {
        let input = self.parse_value_expr()?;
        self.expect_command("placing")?;
        let placing = self.parse_value_expr()?;
        self.expect_command("from")?;
        let from = self.parse_value_expr()?;
        let for_count = if self.eat_command("for") {
            Some(self.parse_value_expr()?)
        } else {
            None
        };
        Ok(FunctionArguments::Overlay {
            input,
            placing,
            from,
            for_count,
        })
    }

    fn parse_trim_args(&mut self) -> Result<FunctionArguments, ParseError> {
        let side = if self.eat_command("leading") {
            Some(TrimSide::Leading)
        } else if self.eat_command("trailing") {
            Some(TrimSide::Trailing)
        } else if self.eat_command("both") {
            Some(TrimSide::Both)
        } else {
            None
        };
        if self.eat_command("from") {
            let input = self.parse_value_expr()?;
            return Ok(FunctionArguments::Trim {
                side,
                characters: None,
                input,
            });
        }
        let first = self.parse_value_expr()?;
        if self.eat_command("from") {
            let input = self.parse_value_expr()?;
            return Ok(FunctionArguments::Trim {
                side,
                characters: Some(first),
                input,
            });
        }
        if side.is_none() && self.check_kind(LexemeKind::COMMA) {
            let mut args = vec![first];
            while self.eat_kind(LexemeKind::COMMA) {
                args.push(self.parse_value_expr()?);
            }
            return Ok(FunctionArguments::List(args));
        }
        Ok(FunctionArguments::Trim {
            side,
            characters: None,
            input: first,
        })
    }

    fn parse_position_args(&mut self) -> Result<FunctionArguments, ParseError> {
        // The needle stops before the IN operator.
        let needle = self.parse_expr_bp(21)?;
        if !self.eat_operator("in") {
            return Err(self.unexpected("IN in POSITION"));
        }
        let haystack = self.parse_value_expr()?;
        Ok(FunctionArguments::Position { needle, haystack })
    }

    /// Identifiers: qualified names, wildcards, function calls, type
    /// constructors, `ARRAY[…]` and `ARRAY(SELECT …)`.
    fn parse_identifier_expression(&mut self) -> Result<ValueExpr, ParseError> {
        let first = self.expect_identifier()?;

        if first.eq_ignore_ascii_case("array") {
            if self.check_kind(LexemeKind::OPEN_BRACKET) {
                self.advance();
                let mut items = Vec::new();
                if !self.check_kind(LexemeKind::CLOSE_BRACKET) {
                    items.push(self.parse_value_expr()?);
                    while self.eat_kind(LexemeKind::COMMA) {
                        items.push(self.parse_value_expr()?);
                    }
                }
                self.expect_close_bracket()?;
                return Ok(ValueExpr::Array(items));
            }
            if self.check_kind(LexemeKind::OPEN_PAREN)
                && self.peek_at(1).is_some_and(|l| {
                    l.is_command("select") || l.is_command("with") || l.is_command("values")
                })
            {
                self.advance();
                let query = self.parse_select_query()?;
                self.expect_close_paren()?;
                return Ok(ValueExpr::ArrayQuery(Box::new(query)));
            }
        }

        let mut namespaces = Vec::new();
        let mut name = first;
        while self.check_kind(LexemeKind::DOT) {
            self.advance();
            if self.check_operator("*") {
                self.advance();
                if self.check_kind(LexemeKind::DOT) {
                    return Err(ParseError::WildcardMisuse {
                        span: self.span_here(),
                        nearby: self.nearby(),
                    });
                }
                namespaces.push(name);
                return Ok(ValueExpr::Column(ColumnReference::qualified(
                    namespaces, "*",
                )));
            }
            namespaces.push(name);
            name = self.expect_identifier()?;
        }

        if self.check_kind(LexemeKind::OPEN_PAREN) {
            if namespaces.is_empty() && is_type_constructor(&name) {
                return Ok(ValueExpr::Type(self.parse_type_arguments(name)?));
            }
            if namespaces.is_empty() && name.eq_ignore_ascii_case("date") {
                // DATE('…') is a call; DATE(6) is a type constructor.
                let is_call = self.peek_at(1).is_some_and(|l| {
                    l.is(LexemeKind::LITERAL) && l.value.starts_with('\'')
                });
                if !is_call {
                    return Ok(ValueExpr::Type(self.parse_type_arguments(name)?));
                }
            }
            let call = self.parse_function_call(QualifiedName::qualified(namespaces, name))?;
            return Ok(ValueExpr::Function(Box::new(call)));
        }

        Ok(ValueExpr::Column(ColumnReference::qualified(
            namespaces, name,
        )))
    }

    fn parse_type_arguments(&mut self, name: String) -> Result<TypeValue, ParseError> {
        self.expect_open_paren()?;
        let mut args = vec![self.parse_value_expr()?];
        while self.eat_kind(LexemeKind::COMMA) {
            args.push(self.parse_value_expr()?);
        }
        self.expect_close_paren()?;
        Ok(TypeValue::with_args(name, args))
    }

    pub(crate) fn parse_function_call(
        &mut self,
        name: QualifiedName,
    ) -> Result<FunctionCall, ParseError> {
        self.expect_open_paren()?;
        let distinct = self.eat_command("distinct");
        let args = if self.check_kind(LexemeKind::CLOSE_PAREN) {
            Vec::new()
        } else if self.check_operator("*")
            && self.peek_at(1).is_some_and(|l| l.is(LexemeKind::CLOSE_PAREN))
        {
            self.advance();
            vec![ValueExpr::Column(ColumnReference::new("*"))]
        } else {
            let mut args = vec![self.parse_value_expr()?];
            while self.eat_kind(LexemeKind::COMMA) {
                args.push(self.parse_value_expr()?);
            }
            // The sole-argument `*` form was handled above; a wildcard
            // mixed into an argument list is illegal.
            self.reject_bare_wildcards(&args)?;
            args
        };
        self.expect_close_paren()?;

        let mut call = FunctionCall::new("placeholder", args);
        call.name = name;
        call.distinct = distinct;

        if self.eat_command("within group") {
            self.expect_open_paren()?;
            self.expect_command("order by")?;
            call.within_group = Some(self.parse_order_by_items()?);
            self.expect_close_paren()?;
        }
        if self.eat_command("filter") {
            self.expect_open_paren()?;
            self.expect_command("where")?;
            call.filter = Some(self.parse_value_expr()?);
            self.expect_close_paren()?;
        }
        if self.eat_command("over") {
            call.over = Some(self.parse_over_clause()?);
        }
        if self.eat_command("with ordinality") {
            call.with_ordinality = true;
        }
        Ok(call)
    }

    pub(crate) fn parse_over_clause(&mut self) -> Result<OverClause, ParseError> {
        if !self.check_kind(LexemeKind::OPEN_PAREN) {
            let name = self.expect_identifier()?;
            return Ok(OverClause::named(name));
        }
        self.advance();
        let mut over = OverClause::empty();
        if self.check_identifier() && !self.check_command("partition by") {
            over.window_name = Some(self.expect_identifier()?);
        }
        if self.eat_command("partition by") {
            over.partition_by.push(self.parse_value_expr()?);
            while self.eat_kind(LexemeKind::COMMA) {
                over.partition_by.push(self.parse_value_expr()?);
            }
        }
        if self.eat_command("order by") {
            over.order_by = self.parse_order_by_items()?;
        }
        over.frame = self.parse_window_frame()?;
        self.expect_close_paren()?;
        Ok(over)
    }

    fn parse_window_frame(&mut self) -> Result<Option<WindowFrameSpec>, ParseError> {
        let unit = if self.eat_command("rows") {
            WindowFrameUnit::Rows
        } else if self.eat_command("range") {
            WindowFrameUnit::Range
        } else if self.eat_command("groups") {
            WindowFrameUnit::Groups
        } else {
            return Ok(None);
        };
        if self.eat_operator("between") {
            let start = self.parse_frame_boundary()?;
            if !self.eat_operator("and") {
                return Err(self.unexpected("AND in window frame"));
            }
            let end = self.parse_frame_boundary()?;
            return Ok(Some(WindowFrameSpec {
                unit,
                start,
                end: Some(end),
            }));
        }
        let start = self.parse_frame_boundary()?;
        Ok(Some(WindowFrameSpec {
            unit,
            start,
            end: None,
        }))
    }

    fn parse_frame_boundary(&mut self) -> Result<WindowFrameBoundary, ParseError> {
        if self.eat_command("unbounded preceding") {
            return Ok(WindowFrameBoundary::UnboundedPreceding);
        }
        if self.eat_command("unbounded following") {
            return Ok(WindowFrameBoundary::UnboundedFollowing);
        }
        if self.eat_command("current row") {
            return Ok(WindowFrameBoundary::CurrentRow);
        }
        let offset = self.parse_value_expr()?;
        if self.eat_command("preceding") {
            Ok(WindowFrameBoundary::Preceding(Box::new(offset)))
        } else if self.eat_command("following") {
            Ok(WindowFrameBoundary::Following(Box::new(offset)))
        } else {
            Err(self.unexpected("PRECEDING or FOLLOWING"))
        }
    }

    /// Sort items shared by ORDER BY, WITHIN GROUP, and OVER clauses.
    pub(crate) fn parse_order_by_items(&mut self) -> Result<Vec<OrderByItem>, ParseError> {
        let mut items = Vec::new();
        loop {
            let expr = self.parse_value_expr()?;
            let direction = if self.eat_command("asc") {
                Some(OrderDirection::Asc)
            } else if self.eat_command("desc") {
                Some(OrderDirection::Desc)
            } else {
                None
            };
            let nulls = if self.eat_command("nulls first") {
                Some(NullsOrder::First)
            } else if self.eat_command("nulls last") {
                Some(NullsOrder::Last)
            } else {
                None
            };
            items.push(OrderByItem {
                expr,
                direction,
                nulls,
            });
            if !self.eat_kind(LexemeKind::COMMA) {
                break;
            }
        }
        Ok(items)
    }

    /// A SQL type: base name, optional arguments, optional `[]` suffix,
    /// and the common multi-word spellings.
    pub(crate) fn parse_type_value(&mut self) -> Result<TypeValue, ParseError> {
        let mut name = self.expect_identifier()?;

        if name.eq_ignore_ascii_case("double")
            && self
                .peek()
                .is_some_and(|l| l.value.eq_ignore_ascii_case("precision"))
        {
            self.advance();
            name.push_str(" precision");
        }

        let mut type_value = if self.check_kind(LexemeKind::OPEN_PAREN) {
            self.parse_type_arguments(name)?
        } else {
            TypeValue::new(name)
        };

        // `timestamp with time zone` and friends.
        let base = type_value.name.to_ascii_lowercase();
        if base == "timestamp" || base == "time" {
            if self.check_command("with")
                && self.peek_at(1).is_some_and(|l| l.value.eq_ignore_ascii_case("time"))
                && self.peek_at(2).is_some_and(|l| l.value.eq_ignore_ascii_case("zone"))
            {
                self.advance();
                self.advance();
                self.advance();
                type_value.name.push_str(" with time zone");
            } else if self
                .peek()
                .is_some_and(|l| l.value.eq_ignore_ascii_case("without"))
                && self.peek_at(1).is_some_and(|l| l.value.eq_ignore_ascii_case("time"))
                && self.peek_at(2).is_some_and(|l| l.value.eq_ignore_ascii_case("zone"))
            {
                self.advance();
                self.advance();
                self.advance();
                type_value.name.push_str(" without time zone");
            }
        }

        while self.check_kind(LexemeKind::OPEN_BRACKET)
            && self.peek_at(1).is_some_and(|l| l.is(LexemeKind::CLOSE_BRACKET))
        {
            self.advance();
            self.advance();
            type_value.name.push_str("[]");
        }

        Ok(type_value)
    }
}

/// An unqualified `*`. Qualified wildcards (`t.*`) are legal qualified
/// names and are not rejected here.
fn is_bare_wildcard(expr: &ValueExpr) -> bool {
    matches!(expr.as_column(), Some(c) if c.is_wildcard() && c.namespaces.is_empty())
}

fn literal_from_text(value: &str) -> LiteralValue {
    match value {
        "null" => LiteralValue::Null,
        "true" => LiteralValue::Boolean(true),
        "false" => LiteralValue::Boolean(false),
        _ if value.starts_with('\'') || value.starts_with('$') => {
            LiteralValue::String(value.to_string())
        }
        _ if value.starts_with(|c: char| c.is_ascii_digit()) => {
            LiteralValue::Number(value.to_string())
        }
        _ => LiteralValue::Keyword(value.to_string()),
    }
}

fn parameter_name(value: &str) -> String {
    if value == "?" {
        return String::new();
    }
    if let Some(inner) = value.strip_prefix("${").and_then(|v| v.strip_suffix('}')) {
        return inner.to_string();
    }
    value
        .strip_prefix(['$', ':', '@'])
        .unwrap_or(value)
        .to_string()
}

//! SELECT statement parsing.

use crate::ast::{
    BinarySelectQuery, CommonTable, Comments, CteBody, Distinct, FetchClause, FetchKind,
    ForClause, FromClause, GroupByClause, HavingClause, JoinClause, JoinCondition, JoinType,
    LockMode, OrderByClause, QualifiedName, SelectClause, SelectItem, SelectQuery, SetOpKind,
    SetOperator, SimpleSelectQuery, SourceExpression, TableAlias, TableSource, ValuesQuery,
    WhereClause, WindowClause, WindowDefinition, WithClause,
};
use crate::lexer::{CommentPosition, LexemeKind};

use super::error::ParseError;
use super::Parser;

impl Parser<'_> {
    /// Parses a SELECT, VALUES, or set-operation query, with an
    /// optional leading WITH clause.
    pub fn parse_select_query(&mut self) -> Result<SelectQuery, ParseError> {
        let with = if self.check_command("with") {
            Some(self.parse_with_clause()?)
        } else {
            None
        };

        let mut query = self.parse_query_term()?;
        loop {
            let Some(op) = self.peek_set_operator() else {
                break;
            };
            self.advance();
            let right = self.parse_query_term()?;
            query = SelectQuery::Binary(BinarySelectQuery {
                comments: Comments::new(),
                left: Box::new(query),
                operator: op,
                right: Box::new(right),
            });
        }

        if let Some(with) = with {
            attach_with(&mut query, with)
                .map_err(|()| self.unexpected("a SELECT body after WITH"))?;
        }
        Ok(query)
    }

    fn peek_set_operator(&self) -> Option<SetOperator> {
        let lexeme = self.peek()?;
        if !lexeme.is(LexemeKind::COMMAND) {
            return None;
        }
        let (kind, all) = match lexeme.value.as_str() {
            "union" => (SetOpKind::Union, false),
            "union all" => (SetOpKind::Union, true),
            "intersect" => (SetOpKind::Intersect, false),
            "intersect all" => (SetOpKind::Intersect, true),
            "except" => (SetOpKind::Except, false),
            "except all" => (SetOpKind::Except, true),
            _ => return None,
        };
        Some(SetOperator { kind, all })
    }

    fn parse_query_term(&mut self) -> Result<SelectQuery, ParseError> {
        if self.check_command("values") {
            return Ok(SelectQuery::Values(self.parse_values_query()?));
        }
        if self.check_kind(LexemeKind::OPEN_PAREN)
            && self.peek_at(1).is_some_and(|l| {
                l.is_command("select") || l.is_command("with") || l.is_command("values")
            })
        {
            self.advance();
            let query = self.parse_select_query()?;
            self.expect_close_paren()?;
            return Ok(query);
        }
        Ok(SelectQuery::Simple(self.parse_simple_select()?))
    }

    /// Parses a WITH clause and its CTE definitions. Duplicate names
    /// (case-insensitive, trimmed) are rejected.
    pub(crate) fn parse_with_clause(&mut self) -> Result<WithClause, ParseError> {
        let comments = self.comments_before_current();
        self.expect_command("with")?;
        let recursive = self.eat_command("recursive");
        let mut tables: Vec<CommonTable> = Vec::new();
        loop {
            let cte_comments = self.comments_before_current();
            let name = self.expect_identifier()?;
            let trimmed = name.trim().to_string();
            if tables
                .iter()
                .any(|t| t.name().trim().eq_ignore_ascii_case(&trimmed))
            {
                return Err(ParseError::DuplicateCte {
                    name: trimmed,
                    span: self.span_here(),
                });
            }
            let columns = if self.check_kind(LexemeKind::OPEN_PAREN) {
                self.advance();
                let mut cols = vec![self.expect_identifier()?];
                while self.eat_kind(LexemeKind::COMMA) {
                    cols.push(self.expect_identifier()?);
                }
                self.expect_close_paren()?;
                Some(cols)
            } else {
                None
            };
            self.expect_command("as")?;
            let materialized = if self.eat_command("materialized") {
                Some(true)
            } else if self.eat_command("not materialized") {
                Some(false)
            } else {
                None
            };
            self.expect_open_paren()?;
            let body = self.parse_cte_body()?;
            self.expect_close_paren()?;
            tables.push(CommonTable {
                comments: cte_comments,
                alias: TableAlias {
                    name: trimmed,
                    columns,
                },
                materialized,
                body,
            });
            if !self.eat_kind(LexemeKind::COMMA) {
                break;
            }
        }
        Ok(WithClause {
            comments,
            recursive,
            tables,
        })
    }

    fn parse_cte_body(&mut self) -> Result<CteBody, ParseError> {
        let first = match self.peek() {
            Some(lexeme) => lexeme.value.clone(),
            None => return Err(self.unexpected("a CTE body")),
        };
        Ok(match first.as_str() {
            "insert into" | "insert" => CteBody::Insert(Box::new(self.parse_insert_query()?)),
            "update" => CteBody::Update(Box::new(self.parse_update_query()?)),
            "delete from" | "delete" => CteBody::Delete(Box::new(self.parse_delete_query()?)),
            "merge into" => CteBody::Merge(Box::new(self.parse_merge_query()?)),
            _ => CteBody::Select(Box::new(self.parse_select_query()?)),
        })
    }

    /// Parses `VALUES (…), (…)`.
    pub(crate) fn parse_values_query(&mut self) -> Result<ValuesQuery, ParseError> {
        let comments = self.comments_before_current();
        self.expect_command("values")?;
        let mut rows = Vec::new();
        loop {
            self.expect_open_paren()?;
            let mut row = vec![self.parse_value_expr()?];
            while self.eat_kind(LexemeKind::COMMA) {
                row.push(self.parse_value_expr()?);
            }
            self.expect_close_paren()?;
            rows.push(row);
            if !self.eat_kind(LexemeKind::COMMA) {
                break;
            }
        }
        Ok(ValuesQuery {
            comments,
            rows,
            column_aliases: None,
        })
    }

    fn parse_simple_select(&mut self) -> Result<SimpleSelectQuery, ParseError> {
        let header = self.comments_before_current();
        self.expect_command("select")?;

        let distinct = if self.eat_command("distinct on") {
            self.expect_open_paren()?;
            let mut exprs = vec![self.parse_value_expr()?];
            while self.eat_kind(LexemeKind::COMMA) {
                exprs.push(self.parse_value_expr()?);
            }
            self.expect_close_paren()?;
            Some(Distinct::DistinctOn(exprs))
        } else if self.eat_command("distinct") {
            Some(Distinct::Distinct)
        } else {
            self.eat_command("all");
            None
        };

        let items = self.parse_select_items()?;
        let select = SelectClause {
            comments: Comments::new(),
            distinct,
            items,
        };

        let mut query = SimpleSelectQuery {
            comments: header,
            select,
            ..SimpleSelectQuery::default()
        };

        if self.check_command("from") {
            query.from = Some(self.parse_from_clause()?);
        }
        if self.check_command("where") {
            let comments = self.comments_before_current();
            self.advance();
            query.where_clause = Some(WhereClause {
                comments,
                condition: self.parse_value_expr()?,
            });
        }
        if self.check_command("group by") {
            let comments = self.comments_before_current();
            self.advance();
            let mut items = vec![self.parse_value_expr()?];
            while self.eat_kind(LexemeKind::COMMA) {
                items.push(self.parse_value_expr()?);
            }
            query.group_by = Some(GroupByClause { comments, items });
        }
        if self.check_command("having") {
            if query.group_by.is_none() {
                return Err(self.unexpected("GROUP BY before HAVING"));
            }
            let comments = self.comments_before_current();
            self.advance();
            query.having = Some(HavingClause {
                comments,
                condition: self.parse_value_expr()?,
            });
        }
        if self.check_command("window") {
            query.window = Some(self.parse_window_clause()?);
        }
        if self.check_command("order by") {
            let comments = self.comments_before_current();
            self.advance();
            query.order_by = Some(OrderByClause {
                comments,
                items: self.parse_order_by_items()?,
            });
        }
        if self.eat_command("limit") {
            query.limit = Some(self.parse_value_expr()?);
        }
        if self.eat_command("offset") {
            query.offset = Some(self.parse_value_expr()?);
            // Tolerate the standard `OFFSET n ROWS` spelling.
            if !self.eat_command("rows") {
                if self
                    .peek()
                    .is_some_and(|l| l.is(LexemeKind::IDENTIFIER) && l.value.eq_ignore_ascii_case("row"))
                {
                    self.advance();
                }
            }
        }
        if self.eat_command("fetch") {
            query.fetch = Some(self.parse_fetch_clause()?);
        }
        query.for_clause = self.parse_for_clause();

        Ok(query)
    }

    fn parse_select_items(&mut self) -> Result<Vec<SelectItem>, ParseError> {
        let mut items = Vec::new();
        loop {
            let comments = self.comments_before_current();
            let expr = self.parse_value_expr()?;
            let alias = if self.eat_command("as") {
                Some(self.expect_identifier()?)
            } else if self.check_kind(LexemeKind::IDENTIFIER) {
                Some(self.expect_identifier()?)
            } else {
                None
            };
            items.push(SelectItem {
                comments,
                expr,
                alias,
            });
            if !self.eat_kind(LexemeKind::COMMA) {
                break;
            }
        }
        Ok(items)
    }

    /// Parses FROM plus any joins.
    pub(crate) fn parse_from_clause(&mut self) -> Result<FromClause, ParseError> {
        let comments = self.comments_before_current();
        self.expect_command("from")?;
        let source = self.parse_source_expression()?;
        let mut from = FromClause {
            comments,
            source,
            joins: Vec::new(),
        };
        loop {
            if self.eat_kind(LexemeKind::COMMA) {
                let source = self.parse_source_expression()?;
                from.joins.push(JoinClause {
                    join_type: JoinType::Cross,
                    natural: false,
                    lateral: false,
                    source,
                    condition: None,
                });
                continue;
            }
            let Some((join_type, natural)) = self.peek_join_type() else {
                break;
            };
            self.advance();
            let lateral = self.eat_command("lateral");
            let source = self.parse_source_expression()?;
            let condition = if natural || join_type == JoinType::Cross {
                None
            } else if self.eat_command("on") {
                Some(JoinCondition::On(self.parse_value_expr()?))
            } else if self.eat_command("using") {
                self.expect_open_paren()?;
                let mut cols = vec![self.expect_identifier()?];
                while self.eat_kind(LexemeKind::COMMA) {
                    cols.push(self.expect_identifier()?);
                }
                self.expect_close_paren()?;
                Some(JoinCondition::Using(cols))
            } else {
                return Err(self.unexpected("ON or USING"));
            };
            from.joins.push(JoinClause {
                join_type,
                natural,
                lateral,
                source,
                condition,
            });
        }
        Ok(from)
    }

    fn peek_join_type(&self) -> Option<(JoinType, bool)> {
        let lexeme = self.peek()?;
        if !lexeme.is(LexemeKind::COMMAND) {
            return None;
        }
        let join = match lexeme.value.as_str() {
            "join" | "inner join" => (JoinType::Inner, false),
            "left join" | "left outer join" => (JoinType::Left, false),
            "right join" | "right outer join" => (JoinType::Right, false),
            "full join" | "full outer join" => (JoinType::Full, false),
            "cross join" => (JoinType::Cross, false),
            "natural join" | "natural inner join" => (JoinType::Inner, true),
            "natural left join" | "natural left outer join" => (JoinType::Left, true),
            "natural right join" | "natural right outer join" => (JoinType::Right, true),
            "natural full join" | "natural full outer join" => (JoinType::Full, true),
            _ => return None,
        };
        Some(join)
    }

    /// Parses one FROM/JOIN source with its alias.
    pub(crate) fn parse_source_expression(&mut self) -> Result<SourceExpression, ParseError> {
        let source = if self.check_kind(LexemeKind::OPEN_PAREN) {
            self.advance();
            if self.starts_select() {
                let query = self.parse_select_query()?;
                self.expect_close_paren()?;
                match query {
                    SelectQuery::Values(values) => TableSource::Values(Box::new(values)),
                    other => TableSource::SubQuery(Box::new(other)),
                }
            } else {
                let inner = self.parse_source_expression()?;
                self.expect_close_paren()?;
                return Ok(inner);
            }
        } else {
            let name = self.parse_qualified_table_name()?;
            if self.check_kind(LexemeKind::OPEN_PAREN) {
                let call = self.parse_function_call(name)?;
                TableSource::Function(Box::new(call))
            } else {
                TableSource::Table(name)
            }
        };

        let alias = self.parse_table_alias()?;
        Ok(SourceExpression { source, alias })
    }

    /// Parses a dotted table name (no wildcard segment).
    pub(crate) fn parse_qualified_table_name(&mut self) -> Result<QualifiedName, ParseError> {
        let mut name = self.expect_identifier()?;
        let mut namespaces = Vec::new();
        while self.check_kind(LexemeKind::DOT) {
            self.advance();
            namespaces.push(name);
            name = self.expect_identifier()?;
        }
        Ok(QualifiedName::qualified(namespaces, name))
    }

    /// Parses `[AS] alias [(col, …)]`. A bare alias must be a proper
    /// identifier; with AS, allow-listed keywords are accepted too.
    pub(crate) fn parse_table_alias(&mut self) -> Result<Option<TableAlias>, ParseError> {
        let name = if self.eat_command("as") {
            Some(self.expect_identifier()?)
        } else if self.check_kind(LexemeKind::IDENTIFIER) {
            Some(self.expect_identifier()?)
        } else {
            None
        };
        let Some(name) = name else {
            return Ok(None);
        };
        let columns = if self.check_kind(LexemeKind::OPEN_PAREN) {
            self.advance();
            let mut cols = vec![self.expect_identifier()?];
            while self.eat_kind(LexemeKind::COMMA) {
                cols.push(self.expect_identifier()?);
            }
            self.expect_close_paren()?;
            Some(cols)
        } else {
            None
        };
        Ok(Some(TableAlias { name, columns }))
    }

    fn parse_window_clause(&mut self) -> Result<WindowClause, ParseError> {
        let comments = self.comments_before_current();
        self.expect_command("window")?;
        let mut definitions: Vec<WindowDefinition> = Vec::new();
        loop {
            let name = self.expect_identifier()?;
            if definitions.iter().any(|d| d.name.eq_ignore_ascii_case(&name)) {
                return Err(self.unexpected(&format!("a window name other than '{name}'")));
            }
            self.expect_command("as")?;
            let spec = self.parse_over_clause()?;
            definitions.push(WindowDefinition { name, spec });
            if !self.eat_kind(LexemeKind::COMMA) {
                break;
            }
        }
        Ok(WindowClause {
            comments,
            definitions,
        })
    }

    fn parse_fetch_clause(&mut self) -> Result<FetchClause, ParseError> {
        let kind = if self.eat_command("first") {
            FetchKind::First
        } else if self.eat_command("next") {
            FetchKind::Next
        } else {
            return Err(self.unexpected("FIRST or NEXT"));
        };
        let count = if self.check_command("rows only")
            || self.check_command("row only")
            || self.check_command("with ties")
        {
            None
        } else {
            Some(self.parse_value_expr()?)
        };
        let with_ties = if self.eat_command("with ties") {
            true
        } else {
            if !self.eat_command("rows only") {
                self.eat_command("row only");
            }
            false
        };
        Ok(FetchClause {
            kind,
            count,
            with_ties,
        })
    }

    fn parse_for_clause(&mut self) -> Option<ForClause> {
        let lock = if self.eat_command("for update") {
            LockMode::Update
        } else if self.eat_command("for share") {
            LockMode::Share
        } else if self.eat_command("for no key update") {
            LockMode::NoKeyUpdate
        } else if self.eat_command("for key share") {
            LockMode::KeyShare
        } else {
            return None;
        };
        let nowait = self.eat_command("nowait");
        let skip_locked = self.eat_command("skip locked");
        Some(ForClause {
            lock,
            nowait,
            skip_locked,
        })
    }

    /// Comments attached as `before` to the current lexeme, lifted into
    /// a node-level comment set.
    pub(crate) fn comments_before_current(&self) -> Comments {
        let mut comments = Comments::new();
        if let Some(lexeme) = self.peek() {
            let before = lexeme.positioned_comments_at(CommentPosition::Before);
            if !before.is_empty() {
                comments.add_positioned(CommentPosition::Before, &before);
            }
            let after = lexeme.positioned_comments_at(CommentPosition::After);
            if !after.is_empty() {
                comments.add_positioned(CommentPosition::After, &after);
            }
        }
        comments
    }
}

fn attach_with(query: &mut SelectQuery, with: WithClause) -> Result<(), ()> {
    match query {
        SelectQuery::Simple(simple) => {
            simple.with = Some(with);
            Ok(())
        }
        SelectQuery::Binary(binary) => attach_with(&mut binary.left, with),
        SelectQuery::Values(_) => Err(()),
    }
}

//! Write statement parsing: INSERT, UPDATE, DELETE, MERGE.

use crate::ast::{
    DeleteQuery, InsertQuery, InsertSource, MergeAction, MergeMatchKind, MergeQuery,
    MergeWhenClause, SelectItem, SetItem, UpdateQuery, WhereClause, WithClause,
};
use crate::lexer::LexemeKind;

use super::error::ParseError;
use super::Parser;

impl Parser<'_> {
    /// Parses an INSERT statement.
    pub fn parse_insert_query(&mut self) -> Result<InsertQuery, ParseError> {
        let comments = self.comments_before_current();
        let with = self.parse_optional_with()?;
        self.expect_command("insert into")?;
        let target = self.parse_qualified_table_name()?;

        let columns = if self.check_kind(LexemeKind::OPEN_PAREN) {
            self.advance();
            let mut cols = vec![self.expect_identifier()?];
            while self.eat_kind(LexemeKind::COMMA) {
                cols.push(self.expect_identifier()?);
            }
            self.expect_close_paren()?;
            cols
        } else {
            Vec::new()
        };

        let source = if self.eat_command("default values") {
            InsertSource::DefaultValues
        } else if self.check_command("values") {
            let values = self.parse_values_query()?;
            InsertSource::Values(values.rows)
        } else if self.starts_select() {
            InsertSource::Select(Box::new(self.parse_select_query()?))
        } else {
            return Err(self.unexpected("VALUES, SELECT, or DEFAULT VALUES"));
        };

        let returning = self.parse_returning()?;
        Ok(InsertQuery {
            comments,
            with,
            target,
            columns,
            source,
            returning,
        })
    }

    /// Parses an UPDATE statement.
    pub fn parse_update_query(&mut self) -> Result<UpdateQuery, ParseError> {
        let comments = self.comments_before_current();
        let with = self.parse_optional_with()?;
        self.expect_command("update")?;
        let target = self.parse_qualified_table_name()?;
        let alias = self.parse_table_alias()?;

        if !self.check_command("set") {
            return Err(ParseError::ExpectedSetClause {
                span: self.span_here(),
                nearby: self.nearby(),
            });
        }
        self.advance();
        let set = self.parse_set_items()?;

        let from = if self.check_command("from") {
            Some(self.parse_from_clause()?)
        } else {
            None
        };
        let where_clause = self.parse_optional_where()?;
        let returning = self.parse_returning()?;
        Ok(UpdateQuery {
            comments,
            with,
            target,
            alias,
            set,
            from,
            where_clause,
            returning,
        })
    }

    /// Parses a DELETE statement.
    pub fn parse_delete_query(&mut self) -> Result<DeleteQuery, ParseError> {
        let comments = self.comments_before_current();
        let with = self.parse_optional_with()?;
        self.expect_command("delete from")?;
        let target = self.parse_qualified_table_name()?;
        let alias = self.parse_table_alias()?;
        let using = if self.check_command("using") {
            // USING reads like a FROM list for join purposes.
            self.advance();
            let source = self.parse_source_expression()?;
            let mut from = crate::ast::FromClause::new(source);
            while self.eat_kind(LexemeKind::COMMA) {
                let source = self.parse_source_expression()?;
                from.joins.push(crate::ast::JoinClause {
                    join_type: crate::ast::JoinType::Cross,
                    natural: false,
                    lateral: false,
                    source,
                    condition: None,
                });
            }
            Some(from)
        } else {
            None
        };
        let where_clause = self.parse_optional_where()?;
        let returning = self.parse_returning()?;
        Ok(DeleteQuery {
            comments,
            with,
            target,
            alias,
            using,
            where_clause,
            returning,
        })
    }

    /// Parses a MERGE statement. At least one WHEN clause is required.
    pub fn parse_merge_query(&mut self) -> Result<MergeQuery, ParseError> {
        let comments = self.comments_before_current();
        let with = self.parse_optional_with()?;
        self.expect_command("merge into")?;
        let target = self.parse_qualified_table_name()?;
        let alias = self.parse_table_alias()?;
        self.expect_command("using")?;
        let source = self.parse_source_expression()?;
        self.expect_command("on")?;
        let on = self.parse_value_expr()?;

        let mut when_clauses = Vec::new();
        loop {
            let Some(match_kind) = self.peek_merge_match_kind() else {
                break;
            };
            self.advance();
            let condition = if self.eat_operator("and") {
                Some(self.parse_value_expr()?)
            } else {
                None
            };
            self.expect_command("then")?;
            let action = self.parse_merge_action()?;
            when_clauses.push(MergeWhenClause {
                match_kind,
                condition,
                action,
            });
        }
        if when_clauses.is_empty() {
            return Err(self.unexpected("at least one WHEN clause"));
        }

        let returning = self.parse_returning()?;
        Ok(MergeQuery {
            comments,
            with,
            target,
            alias,
            source,
            on,
            when_clauses,
            returning,
        })
    }

    fn peek_merge_match_kind(&self) -> Option<MergeMatchKind> {
        let lexeme = self.peek()?;
        match lexeme.value.as_str() {
            "when matched" => Some(MergeMatchKind::Matched),
            "when not matched" | "when not matched by target" => {
                Some(MergeMatchKind::NotMatchedByTarget)
            }
            "when not matched by source" => Some(MergeMatchKind::NotMatchedBySource),
            _ => None,
        }
    }

    fn parse_merge_action(&mut self) -> Result<MergeAction, ParseError> {
        if self.eat_command("do nothing") {
            return Ok(MergeAction::DoNothing);
        }
        if self.eat_command("update") {
            // SET is optional in the action form.
            if !self.eat_command("set") && !self.check_identifier() {
                return Err(ParseError::ExpectedSetClause {
                    span: self.span_here(),
                    nearby: self.nearby(),
                });
            }
            let set = self.parse_set_items()?;
            let where_clause = if self.eat_command("where") {
                Some(self.parse_value_expr()?)
            } else {
                None
            };
            return Ok(MergeAction::Update { set, where_clause });
        }
        if self.eat_command("delete") {
            let where_clause = if self.eat_command("where") {
                Some(self.parse_value_expr()?)
            } else {
                None
            };
            return Ok(MergeAction::Delete { where_clause });
        }
        if self.eat_command("insert default values") {
            return Ok(MergeAction::InsertDefaultValues);
        }
        if self.eat_command("insert") {
            let columns = if self.check_kind(LexemeKind::OPEN_PAREN) {
                self.advance();
                let mut cols = vec![self.expect_identifier()?];
                while self.eat_kind(LexemeKind::COMMA) {
                    cols.push(self.expect_identifier()?);
                }
                self.expect_close_paren()?;
                cols
            } else {
                Vec::new()
            };
            if self.eat_command("default values") {
                return Ok(MergeAction::InsertDefaultValues);
            }
            self.expect_command("values")?;
            self.expect_open_paren()?;
            let mut values = vec![self.parse_value_expr()?];
            while self.eat_kind(LexemeKind::COMMA) {
                values.push(self.parse_value_expr()?);
            }
            self.expect_close_paren()?;
            return Ok(MergeAction::Insert { columns, values });
        }
        Err(self.unexpected("UPDATE, DELETE, INSERT, or DO NOTHING"))
    }

    /// Parses `column [= value]` assignments after SET.
    fn parse_set_items(&mut self) -> Result<Vec<SetItem>, ParseError> {
        let mut items = Vec::new();
        loop {
            let column = self.parse_qualified_table_name()?;
            if !self.eat_operator("=") {
                return Err(self.unexpected("= in SET assignment"));
            }
            let value = self.parse_value_expr()?;
            items.push(SetItem { column, value });
            if !self.eat_kind(LexemeKind::COMMA) {
                break;
            }
        }
        Ok(items)
    }

    fn parse_optional_with(&mut self) -> Result<Option<WithClause>, ParseError> {
        if self.check_command("with") {
            Ok(Some(self.parse_with_clause()?))
        } else {
            Ok(None)
        }
    }

    fn parse_optional_where(&mut self) -> Result<Option<WhereClause>, ParseError> {
        if !self.check_command("where") {
            return Ok(None);
        }
        let comments = self.comments_before_current();
        self.advance();
        Ok(Some(WhereClause {
            comments,
            condition: self.parse_value_expr()?,
        }))
    }

    /// Parses a RETURNING projection. `*` expands downstream.
    fn parse_returning(&mut self) -> Result<Option<Vec<SelectItem>>, ParseError> {
        if !self.eat_command("returning") {
            return Ok(None);
        }
        let mut items = Vec::new();
        loop {
            let expr = self.parse_value_expr()?;
            let alias = if self.eat_command("as") {
                Some(self.expect_identifier()?)
            } else if self.check_kind(LexemeKind::IDENTIFIER) {
                Some(self.expect_identifier()?)
            } else {
                None
            };
            items.push(match alias {
                Some(alias) => SelectItem::aliased(expr, alias),
                None => SelectItem::new(expr),
            });
            if !self.eat_kind(LexemeKind::COMMA) {
                break;
            }
        }
        Ok(Some(items))
    }
}

//! DDL and utility statement parsing.

use crate::ast::{
    AlterTableAction, AlterTableQuery, CheckpointQuery, ColumnDef, CommentOnQuery,
    CommentTargetKind, CreateIndexQuery, CreateSchemaQuery, CreateTableQuery, DropBehavior,
    DropObjectKind, DropObjectQuery, ExplainQuery, IndexColumn, OrderDirection, QualifiedName,
    TableConstraint, VacuumQuery,
};
use crate::lexer::LexemeKind;

use super::error::ParseError;
use super::Parser;

impl Parser<'_> {
    /// Parses a CREATE TABLE statement.
    pub fn parse_create_table_query(&mut self) -> Result<CreateTableQuery, ParseError> {
        let comments = self.comments_before_current();
        let temporary = if self.eat_command("create temporary table")
            || self.eat_command("create temp table")
        {
            true
        } else {
            self.expect_command("create table")?;
            false
        };
        let if_not_exists = self.eat_command("if not exists");
        let name = self.parse_qualified_table_name()?;

        let mut query = CreateTableQuery {
            comments,
            name,
            if_not_exists,
            temporary,
            columns: Vec::new(),
            constraints: Vec::new(),
            as_query: None,
        };

        if self.eat_command("as") {
            query.as_query = Some(Box::new(self.parse_select_query()?));
            return Ok(query);
        }

        self.expect_open_paren()?;
        loop {
            if let Some(constraint) = self.try_parse_table_constraint()? {
                query.constraints.push(constraint);
            } else {
                let (column, fk) = self.parse_column_def()?;
                query.columns.push(column);
                if let Some(fk) = fk {
                    query.constraints.push((None, fk));
                }
            }
            if !self.eat_kind(LexemeKind::COMMA) {
                break;
            }
        }
        self.expect_close_paren()?;
        Ok(query)
    }

    fn try_parse_table_constraint(
        &mut self,
    ) -> Result<Option<(Option<String>, TableConstraint)>, ParseError> {
        let name = if self.eat_command("constraint") {
            Some(self.expect_identifier()?)
        } else if self.check_command("primary key")
            || self.check_command("unique") && self.peek_at(1).is_some_and(|l| l.is(LexemeKind::OPEN_PAREN))
            || self.check_command("foreign key")
            || self.check_command("check") && self.peek_at(1).is_some_and(|l| l.is(LexemeKind::OPEN_PAREN))
        {
            None
        } else {
            return Ok(None);
        };
        Ok(Some((name, self.parse_constraint_body()?)))
    }

    fn parse_constraint_body(&mut self) -> Result<TableConstraint, ParseError> {
        if self.eat_command("primary key") {
            return Ok(TableConstraint::PrimaryKey(self.parse_paren_names()?));
        }
        if self.eat_command("unique") {
            return Ok(TableConstraint::Unique(self.parse_paren_names()?));
        }
        if self.eat_command("foreign key") {
            let columns = self.parse_paren_names()?;
            self.expect_command("references")?;
            let references = self.parse_qualified_table_name()?;
            let ref_columns = if self.check_kind(LexemeKind::OPEN_PAREN) {
                self.parse_paren_names()?
            } else {
                Vec::new()
            };
            return Ok(TableConstraint::ForeignKey {
                columns,
                references,
                ref_columns,
            });
        }
        if self.eat_command("check") {
            self.expect_open_paren()?;
            let predicate = self.parse_value_expr()?;
            self.expect_close_paren()?;
            return Ok(TableConstraint::Check(predicate));
        }
        Err(self.unexpected("a table constraint"))
    }

    fn parse_paren_names(&mut self) -> Result<Vec<String>, ParseError> {
        self.expect_open_paren()?;
        let mut names = vec![self.expect_identifier()?];
        while self.eat_kind(LexemeKind::COMMA) {
            names.push(self.expect_identifier()?);
        }
        self.expect_close_paren()?;
        Ok(names)
    }

    /// One column definition. A trailing REFERENCES turns into an
    /// anonymous foreign-key constraint on the table.
    fn parse_column_def(
        &mut self,
    ) -> Result<(ColumnDef, Option<TableConstraint>), ParseError> {
        let name = self.expect_identifier()?;
        let data_type = self.parse_type_value()?;
        let mut column = ColumnDef {
            name,
            data_type,
            not_null: false,
            default: None,
            primary_key: false,
            unique: false,
        };
        let mut foreign_key = None;

        loop {
            if self.check_operator("not")
                && self.peek_at(1).is_some_and(|l| l.value == "null")
            {
                self.advance();
                self.advance();
                column.not_null = true;
                continue;
            }
            if self.eat_command("default") {
                column.default = Some(self.parse_value_expr()?);
                continue;
            }
            if self.eat_command("primary key") {
                column.primary_key = true;
                continue;
            }
            if self.eat_command("unique") {
                column.unique = true;
                continue;
            }
            if self.eat_command("references") {
                let references = self.parse_qualified_table_name()?;
                let ref_columns = if self.check_kind(LexemeKind::OPEN_PAREN) {
                    self.parse_paren_names()?
                } else {
                    Vec::new()
                };
                foreign_key = Some(TableConstraint::ForeignKey {
                    columns: vec![column.name.clone()],
                    references,
                    ref_columns,
                });
                continue;
            }
            break;
        }
        Ok((column, foreign_key))
    }

    /// Parses a CREATE INDEX statement.
    pub fn parse_create_index_query(&mut self) -> Result<CreateIndexQuery, ParseError> {
        let comments = self.comments_before_current();
        let unique = if self.eat_command("create unique index") {
            true
        } else {
            self.expect_command("create index")?;
            false
        };
        let if_not_exists = self.eat_command("if not exists");
        let name = if self.check_command("on") {
            None
        } else {
            Some(self.expect_identifier()?)
        };
        self.expect_command("on")?;
        let table = self.parse_qualified_table_name()?;
        self.expect_open_paren()?;
        let mut columns = Vec::new();
        loop {
            let expr = self.parse_value_expr()?;
            let direction = if self.eat_command("asc") {
                Some(OrderDirection::Asc)
            } else if self.eat_command("desc") {
                Some(OrderDirection::Desc)
            } else {
                None
            };
            columns.push(IndexColumn { expr, direction });
            if !self.eat_kind(LexemeKind::COMMA) {
                break;
            }
        }
        self.expect_close_paren()?;
        let where_clause = if self.eat_command("where") {
            Some(self.parse_value_expr()?)
        } else {
            None
        };
        Ok(CreateIndexQuery {
            comments,
            unique,
            name,
            if_not_exists,
            table,
            columns,
            where_clause,
        })
    }

    /// Parses a CREATE SCHEMA statement.
    pub fn parse_create_schema_query(&mut self) -> Result<CreateSchemaQuery, ParseError> {
        let comments = self.comments_before_current();
        self.expect_command("create schema")?;
        let if_not_exists = self.eat_command("if not exists");
        let name = self.expect_identifier()?;
        Ok(CreateSchemaQuery {
            comments,
            name,
            if_not_exists,
        })
    }

    /// Parses a DROP TABLE/INDEX/SCHEMA statement.
    pub fn parse_drop_query(
        &mut self,
        kind: DropObjectKind,
    ) -> Result<DropObjectQuery, ParseError> {
        let comments = self.comments_before_current();
        let keyword = format!("drop {}", kind.as_str());
        self.expect_command(&keyword)?;
        let if_exists = self.eat_command("if exists");
        let mut names = vec![self.parse_qualified_table_name()?];
        while self.eat_kind(LexemeKind::COMMA) {
            names.push(self.parse_qualified_table_name()?);
        }
        let behavior = self.parse_drop_behavior();
        Ok(DropObjectQuery {
            comments,
            kind,
            if_exists,
            names,
            behavior,
        })
    }

    fn parse_drop_behavior(&mut self) -> Option<DropBehavior> {
        if self.eat_command("cascade") {
            Some(DropBehavior::Cascade)
        } else if self.eat_command("restrict") {
            Some(DropBehavior::Restrict)
        } else {
            None
        }
    }

    /// Parses an ALTER TABLE statement. Unknown actions are rejected
    /// with their position.
    pub fn parse_alter_table_query(&mut self) -> Result<AlterTableQuery, ParseError> {
        let comments = self.comments_before_current();
        self.expect_command("alter table")?;
        let name = self.parse_qualified_table_name()?;
        let mut actions = vec![self.parse_alter_action()?];
        while self.eat_kind(LexemeKind::COMMA) {
            actions.push(self.parse_alter_action()?);
        }
        Ok(AlterTableQuery {
            comments,
            name,
            actions,
        })
    }

    fn parse_alter_action(&mut self) -> Result<AlterTableAction, ParseError> {
        if self.eat_command("add") {
            let (name, if_not_exists) = if self.eat_command("constraint") {
                let if_not_exists = self.eat_command("if not exists");
                (Some(self.expect_identifier()?), if_not_exists)
            } else {
                (None, false)
            };
            let constraint = self.parse_constraint_body()?;
            let not_valid = self.eat_command("not valid");
            return Ok(AlterTableAction::AddConstraint {
                name,
                if_not_exists,
                constraint,
                not_valid,
            });
        }
        if self.eat_command("drop") {
            if self.eat_command("constraint") {
                let if_exists = self.eat_command("if exists");
                let name = self.expect_identifier()?;
                let behavior = self.parse_drop_behavior();
                return Ok(AlterTableAction::DropConstraint {
                    if_exists,
                    name,
                    behavior,
                });
            }
            if self.eat_command("column") {
                let if_exists = self.eat_command("if exists");
                let name = self.expect_identifier()?;
                let behavior = self.parse_drop_behavior();
                return Ok(AlterTableAction::DropColumn {
                    if_exists,
                    name,
                    behavior,
                });
            }
            return Err(ParseError::UnsupportedAction {
                action: format!("drop {}", self.found_value()),
                span: self.span_here(),
                nearby: self.nearby(),
            });
        }
        if self.eat_command("alter column") {
            let column = self.expect_identifier()?;
            if self.eat_command("set default") {
                let default = self.parse_value_expr()?;
                return Ok(AlterTableAction::AlterColumnSetDefault { column, default });
            }
            if self.eat_command("drop default") {
                return Ok(AlterTableAction::AlterColumnDropDefault { column });
            }
            return Err(ParseError::UnsupportedAction {
                action: format!("alter column {}", self.found_value()),
                span: self.span_here(),
                nearby: self.nearby(),
            });
        }
        Err(ParseError::UnsupportedAction {
            action: self.found_value(),
            span: self.span_here(),
            nearby: self.nearby(),
        })
    }

    /// Parses a COMMENT ON statement.
    pub fn parse_comment_on_query(&mut self) -> Result<CommentOnQuery, ParseError> {
        let comments = self.comments_before_current();
        self.expect_command("comment on")?;
        let kind_word = self.expect_identifier()?;
        let target_kind = match kind_word.to_ascii_lowercase().as_str() {
            "table" => CommentTargetKind::Table,
            "column" => CommentTargetKind::Column,
            "index" => CommentTargetKind::Index,
            "schema" => CommentTargetKind::Schema,
            _ => {
                return Err(self.unexpected("TABLE, COLUMN, INDEX, or SCHEMA"));
            }
        };
        let target = self.parse_qualified_table_name()?;
        if !self.eat_operator("is") {
            return Err(self.unexpected("IS"));
        }
        let text = match self.peek() {
            Some(l) if l.is(LexemeKind::LITERAL) && l.value == "null" => {
                self.advance();
                None
            }
            Some(l) if l.is(LexemeKind::LITERAL) && l.value.starts_with('\'') => {
                let value = l.value.clone();
                self.advance();
                Some(value)
            }
            _ => return Err(self.unexpected("a string literal or NULL")),
        };
        Ok(CommentOnQuery {
            comments,
            target_kind,
            target,
            text,
        })
    }

    /// Parses an EXPLAIN statement.
    pub fn parse_explain_query(&mut self) -> Result<ExplainQuery, ParseError> {
        let comments = self.comments_before_current();
        self.expect_command("explain")?;
        let analyze = self.eat_command("analyze");
        let verbose = self.eat_command("verbose");
        let statement = Box::new(self.parse_statement()?);
        Ok(ExplainQuery {
            comments,
            analyze,
            verbose,
            statement,
        })
    }

    /// Parses a VACUUM statement.
    pub fn parse_vacuum_query(&mut self) -> Result<VacuumQuery, ParseError> {
        let comments = self.comments_before_current();
        self.expect_command("vacuum")?;
        let full = self.eat_command("full");
        let analyze = self.eat_command("analyze");
        let mut tables: Vec<QualifiedName> = Vec::new();
        if self.check_identifier() {
            tables.push(self.parse_qualified_table_name()?);
            while self.eat_kind(LexemeKind::COMMA) {
                tables.push(self.parse_qualified_table_name()?);
            }
        }
        Ok(VacuumQuery {
            comments,
            full,
            analyze,
            tables,
        })
    }

    /// Parses a CHECKPOINT statement.
    pub fn parse_checkpoint_query(&mut self) -> Result<CheckpointQuery, ParseError> {
        let comments = self.comments_before_current();
        self.expect_command("checkpoint")?;
        Ok(CheckpointQuery { comments })
    }
}

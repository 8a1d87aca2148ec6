//! Phase 1 of the print pipeline: walk the AST into a print token tree,
//! collecting parameters in first-occurrence order.

use crate::ast::{
    AlterTableAction, AlterTableQuery, BinarySelectQuery, CaseExpression, CastForm,
    CheckpointQuery, ColumnDef, CommentOnQuery, Comments, CommonTable, CreateIndexQuery,
    CreateSchemaQuery, CreateTableQuery, CteBody, DeleteQuery, Distinct, DropBehavior,
    DropObjectQuery, ExplainQuery, FetchKind, FromClause, FunctionArguments, FunctionCall,
    InsertQuery, InsertSource, JoinClause, JoinCondition, JoinType, LiteralValue, MergeAction,
    MergeQuery, OrderByItem, OrderDirection, OverClause, ParameterExpression, QualifiedName,
    NullsOrder, SelectItem, SelectQuery, SetItem, SimpleSelectQuery, SourceExpression, Statement,
    TableAlias, TableConstraint, TableSource, TypeValue, UpdateQuery, VacuumQuery, ValueExpr,
    ValuesQuery, WindowFrameBoundary, WindowFrameSpec, WithClause,
};
use crate::lexer::{is_reserved, CommentPosition};

use super::style::{ParameterStyle, SqlPrintStyle};
use super::token::{CommentLevel, ContainerKind, PrintToken};

/// Walks AST nodes into print tokens.
pub struct PrintTokenBuilder<'a> {
    style: &'a SqlPrintStyle,
    params: Vec<(String, Option<LiteralValue>)>,
    anonymous_seq: usize,
}

impl<'a> PrintTokenBuilder<'a> {
    /// Creates a builder for the given style.
    #[must_use]
    pub fn new(style: &'a SqlPrintStyle) -> Self {
        Self {
            style,
            params: Vec::new(),
            anonymous_seq: 0,
        }
    }

    /// The collected parameters, in first-occurrence order.
    #[must_use]
    pub fn into_params(self) -> Vec<(String, Option<LiteralValue>)> {
        self.params
    }

    /// Builds the token tree for any statement.
    pub fn build_statement(&mut self, statement: &Statement) -> PrintToken {
        let mut tokens = self.comment_tokens(statement.comments(), CommentLevel::Top);
        match statement {
            Statement::Select(q) => tokens.extend(self.select_query_tokens(q)),
            Statement::Insert(q) => tokens.extend(self.insert_tokens(q)),
            Statement::Update(q) => tokens.extend(self.update_tokens(q)),
            Statement::Delete(q) => tokens.extend(self.delete_tokens(q)),
            Statement::Merge(q) => tokens.extend(self.merge_tokens(q)),
            Statement::CreateTable(q) => tokens.extend(self.create_table_tokens(q)),
            Statement::CreateIndex(q) => tokens.extend(self.create_index_tokens(q)),
            Statement::CreateSchema(q) => tokens.extend(self.create_schema_tokens(q)),
            Statement::Drop(q) => tokens.extend(self.drop_tokens(q)),
            Statement::AlterTable(q) => tokens.extend(self.alter_table_tokens(q)),
            Statement::CommentOn(q) => tokens.extend(self.comment_on_tokens(q)),
            Statement::Explain(q) => tokens.extend(self.explain_tokens(q)),
            Statement::Vacuum(q) => tokens.extend(self.vacuum_tokens(q)),
            Statement::Checkpoint(q) => tokens.extend(self.checkpoint_tokens(q)),
        }
        PrintToken::container(ContainerKind::Statement, tokens)
    }

    /// Builds the token tree for a select query.
    pub fn build_query(&mut self, query: &SelectQuery) -> PrintToken {
        let mut tokens = self.comment_tokens(query.comments(), CommentLevel::Top);
        tokens.extend(self.select_query_tokens(query));
        PrintToken::container(ContainerKind::Statement, tokens)
    }

    fn comment_tokens(&self, comments: &Comments, level: CommentLevel) -> Vec<PrintToken> {
        comments
            .effective(CommentPosition::Before)
            .into_iter()
            .map(|text| PrintToken::comment(level, text))
            .collect()
    }

    fn trailing_comment_tokens(
        &self,
        comments: &Comments,
        level: CommentLevel,
    ) -> Vec<PrintToken> {
        comments
            .positioned_at(CommentPosition::After)
            .into_iter()
            .map(|text| PrintToken::comment(level, text))
            .collect()
    }

    /// Escapes an identifier per the style when needed.
    fn ident(&self, name: &str) -> PrintToken {
        if name == "*" {
            return PrintToken::value("*");
        }
        let plain = name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if plain && !is_reserved(name) {
            return PrintToken::value(name);
        }
        let (open, close) = self.style.identifier_escape;
        let escaped = name.replace(close, &format!("{close}{close}"));
        PrintToken::value(format!("{open}{escaped}{close}"))
    }

    fn qualified_name_tokens(&self, name: &QualifiedName) -> Vec<PrintToken> {
        let mut tokens = Vec::new();
        for segment in &name.namespaces {
            tokens.push(self.ident(segment));
            tokens.push(PrintToken::dot());
        }
        tokens.push(self.ident(&name.name));
        tokens
    }

    fn parameter_token(&mut self, param: &ParameterExpression) -> PrintToken {
        match self.style.parameter_style {
            ParameterStyle::Anonymous => {
                self.params.push((param.name.clone(), param.value.clone()));
                PrintToken::parameter("?")
            }
            ParameterStyle::Indexed => {
                let index = if param.name.is_empty() {
                    self.params.push((String::new(), param.value.clone()));
                    self.params.len()
                } else if let Some(i) = self.params.iter().position(|(n, _)| *n == param.name) {
                    i + 1
                } else {
                    self.params.push((param.name.clone(), param.value.clone()));
                    self.params.len()
                };
                PrintToken::parameter(format!("{}{index}", self.style.parameter_symbol))
            }
            ParameterStyle::Named => {
                let name = if param.name.is_empty() {
                    self.anonymous_seq += 1;
                    format!("p{}", self.anonymous_seq)
                } else {
                    param.name.clone()
                };
                if !self.params.iter().any(|(n, _)| *n == name) {
                    self.params.push((name.clone(), param.value.clone()));
                }
                if self.style.parameter_symbol == '?' {
                    PrintToken::parameter("?")
                } else {
                    PrintToken::parameter(format!("{}{name}", self.style.parameter_symbol))
                }
            }
        }
    }

    fn literal_token(&self, literal: &LiteralValue) -> PrintToken {
        match literal {
            LiteralValue::Number(text) | LiteralValue::String(text) => PrintToken::value(text),
            LiteralValue::Boolean(true) => PrintToken::keyword("true"),
            LiteralValue::Boolean(false) => PrintToken::keyword("false"),
            LiteralValue::Null => PrintToken::keyword("null"),
            LiteralValue::Keyword(word) => PrintToken::keyword(word),
        }
    }

    /// Value expression tokens; the visitor of the print pipeline.
    pub(crate) fn value_tokens(&mut self, expr: &ValueExpr) -> Vec<PrintToken> {
        match expr {
            ValueExpr::Literal(literal) => vec![self.literal_token(literal)],
            ValueExpr::RawString(text) => vec![PrintToken::keyword(text)],
            ValueExpr::IdentifierString(name) => vec![self.ident(name)],
            ValueExpr::Column(column) => {
                let mut tokens = Vec::new();
                for segment in &column.namespaces {
                    tokens.push(self.ident(segment));
                    tokens.push(PrintToken::dot());
                }
                tokens.push(self.ident(&column.name));
                tokens
            }
            ValueExpr::Parameter(param) => vec![self.parameter_token(param)],
            ValueExpr::Function(call) => self.function_tokens(call),
            ValueExpr::Unary(unary) => {
                let mut tokens = vec![PrintToken::operator(&unary.operator)];
                tokens.extend(self.value_tokens(&unary.expr));
                tokens
            }
            ValueExpr::Binary(binary) => {
                let mut tokens = self.value_tokens(&binary.left);
                tokens.push(PrintToken::operator(&binary.operator));
                tokens.extend(self.value_tokens(&binary.right));
                tokens
            }
            ValueExpr::Between(between) => {
                let mut tokens = self.value_tokens(&between.expr);
                tokens.push(PrintToken::operator(if between.negated {
                    "not between"
                } else {
                    "between"
                }));
                tokens.extend(self.value_tokens(&between.lower));
                tokens.push(PrintToken::operator("and"));
                tokens.extend(self.value_tokens(&between.upper));
                vec![PrintToken::container(ContainerKind::BetweenExpr, tokens)]
            }
            ValueExpr::Cast(cast) => match cast.form {
                CastForm::Standard => {
                    let mut tokens = vec![PrintToken::keyword("cast"), PrintToken::open("(")];
                    tokens.extend(self.value_tokens(&cast.expr));
                    tokens.push(PrintToken::keyword("as"));
                    tokens.extend(self.type_tokens(&cast.target));
                    tokens.push(PrintToken::close(")"));
                    tokens
                }
                CastForm::Shorthand => {
                    let mut tokens = self.value_tokens(&cast.expr);
                    tokens.push(PrintToken::operator("::"));
                    tokens.extend(self.type_tokens(&cast.target));
                    tokens
                }
            },
            ValueExpr::Case(case) => self.case_tokens(case),
            ValueExpr::Paren(inner) => {
                let mut tokens = vec![PrintToken::open("(")];
                tokens.extend(self.value_tokens(inner));
                tokens.push(PrintToken::close(")"));
                vec![PrintToken::container(ContainerKind::ParenExpr, tokens)]
            }
            ValueExpr::Tuple(items) | ValueExpr::ValueList(items) => {
                let mut tokens = vec![PrintToken::open("(")];
                self.push_comma_list(&mut tokens, items);
                tokens.push(PrintToken::close(")"));
                tokens
            }
            ValueExpr::Array(items) => {
                let mut tokens = vec![PrintToken::keyword("array"), PrintToken::open("[")];
                self.push_comma_list(&mut tokens, items);
                tokens.push(PrintToken::close("]"));
                tokens
            }
            ValueExpr::ArrayQuery(query) => {
                let mut tokens = vec![PrintToken::keyword("array"), PrintToken::open("(")];
                tokens.extend(self.select_query_tokens(query));
                tokens.push(PrintToken::close(")"));
                tokens
            }
            ValueExpr::ArrayIndex(index) => {
                let mut tokens = self.value_tokens(&index.array);
                tokens.push(PrintToken::open("["));
                tokens.extend(self.value_tokens(&index.index));
                tokens.push(PrintToken::close("]"));
                tokens
            }
            ValueExpr::ArraySlice(slice) => {
                let mut tokens = self.value_tokens(&slice.array);
                tokens.push(PrintToken::open("["));
                if let Some(from) = &slice.from {
                    tokens.extend(self.value_tokens(from));
                }
                tokens.push(PrintToken::operator(":"));
                if let Some(to) = &slice.to {
                    tokens.extend(self.value_tokens(to));
                }
                tokens.push(PrintToken::close("]"));
                tokens
            }
            ValueExpr::Type(type_value) => self.type_tokens(type_value),
            ValueExpr::StringSpecifier(spec) => {
                vec![PrintToken::value(format!("{}{}", spec.specifier, spec.payload))]
            }
            ValueExpr::InlineQuery(query) => {
                let mut tokens = vec![PrintToken::open("(")];
                tokens.extend(self.select_query_tokens(query));
                tokens.push(PrintToken::close(")"));
                vec![PrintToken::container(ContainerKind::SubQuery, tokens)]
            }
        }
    }

    fn push_comma_list(&mut self, tokens: &mut Vec<PrintToken>, items: &[ValueExpr]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                tokens.push(PrintToken::comma());
            }
            tokens.extend(self.value_tokens(item));
        }
    }

    fn type_tokens(&mut self, type_value: &TypeValue) -> Vec<PrintToken> {
        let mut tokens = vec![PrintToken::type_name(&type_value.name)];
        if !type_value.args.is_empty() {
            tokens.push(PrintToken::open("("));
            self.push_comma_list(&mut tokens, &type_value.args);
            tokens.push(PrintToken::close(")"));
        }
        tokens
    }

    fn function_tokens(&mut self, call: &FunctionCall) -> Vec<PrintToken> {
        let mut tokens = Vec::new();
        for segment in &call.name.namespaces {
            tokens.push(self.ident(segment));
            tokens.push(PrintToken::dot());
        }
        tokens.push(PrintToken::value(call.name.name.to_ascii_lowercase()));
        tokens.push(PrintToken::open("("));
        if call.distinct {
            tokens.push(PrintToken::keyword("distinct"));
        }
        let mut args = Vec::new();
        match &call.args {
            FunctionArguments::List(items) => self.push_comma_list(&mut args, items),
            FunctionArguments::Substring {
                input,
                from,
                for_count,
            } => {
                args.extend(self.value_tokens(input));
                if let Some(from) = from {
                    args.push(PrintToken::keyword("from"));
                    args.extend(self.value_tokens(from));
                }
                if let Some(count) = for_count {
                    args.push(PrintToken::keyword("for"));
                    args.extend(self.value_tokens(count));
                }
            }
            FunctionArguments::Overlay {
                input,
                placing,
                from,
                for_count,
            } => {
                args.extend(self.value_tokens(input));
                args.push(PrintToken::keyword("placing"));
                args.extend(self.value_tokens(placing));
                args.push(PrintToken::keyword("from"));
                args.extend(self.value_tokens(from));
                if let Some(count) = for_count {
                    args.push(PrintToken::keyword("for"));
                    args.extend(self.value_tokens(count));
                }
            }
            FunctionArguments::Trim {
                side,
                characters,
                input,
            } => {
                let keyworded = side.is_some() || characters.is_some();
                if let Some(side) = side {
                    args.push(PrintToken::keyword(side.as_str()));
                }
                if let Some(characters) = characters {
                    args.extend(self.value_tokens(characters));
                }
                if keyworded {
                    args.push(PrintToken::keyword("from"));
                }
                args.extend(self.value_tokens(input));
            }
            FunctionArguments::Position { needle, haystack } => {
                args.extend(self.value_tokens(needle));
                args.push(PrintToken::operator("in"));
                args.extend(self.value_tokens(haystack));
            }
        }
        tokens.push(PrintToken::container(ContainerKind::FunctionArguments, args));
        tokens.push(PrintToken::close(")"));

        if let Some(within) = &call.within_group {
            tokens.push(PrintToken::keyword("within group"));
            tokens.push(PrintToken::open("("));
            tokens.push(PrintToken::keyword("order by"));
            tokens.extend(self.order_by_item_list(within));
            tokens.push(PrintToken::close(")"));
        }
        if let Some(filter) = &call.filter {
            tokens.push(PrintToken::keyword("filter"));
            tokens.push(PrintToken::open("("));
            tokens.push(PrintToken::keyword("where"));
            tokens.extend(self.value_tokens(filter));
            tokens.push(PrintToken::close(")"));
        }
        if let Some(over) = &call.over {
            tokens.push(PrintToken::keyword("over"));
            tokens.extend(self.over_tokens(over));
        }
        if call.with_ordinality {
            tokens.push(PrintToken::keyword("with ordinality"));
        }
        tokens
    }

    fn over_tokens(&mut self, over: &OverClause) -> Vec<PrintToken> {
        if let Some(name) = &over.window_name {
            if over.partition_by.is_empty() && over.order_by.is_empty() && over.frame.is_none() {
                return vec![self.ident(name)];
            }
        }
        let mut tokens = vec![PrintToken::open("(")];
        if let Some(name) = &over.window_name {
            tokens.push(self.ident(name));
        }
        if !over.partition_by.is_empty() {
            tokens.push(PrintToken::keyword("partition by"));
            self.push_comma_list(&mut tokens, &over.partition_by);
        }
        if !over.order_by.is_empty() {
            tokens.push(PrintToken::keyword("order by"));
            tokens.extend(self.order_by_item_list(&over.order_by));
        }
        if let Some(frame) = &over.frame {
            tokens.extend(self.frame_tokens(frame));
        }
        tokens.push(PrintToken::close(")"));
        tokens
    }

    fn frame_tokens(&mut self, frame: &WindowFrameSpec) -> Vec<PrintToken> {
        let mut tokens = vec![PrintToken::keyword(frame.unit.as_str())];
        if let Some(end) = &frame.end {
            tokens.push(PrintToken::operator("between"));
            tokens.extend(self.frame_boundary_tokens(&frame.start));
            tokens.push(PrintToken::operator("and"));
            tokens.extend(self.frame_boundary_tokens(end));
        } else {
            tokens.extend(self.frame_boundary_tokens(&frame.start));
        }
        tokens
    }

    fn frame_boundary_tokens(&mut self, boundary: &WindowFrameBoundary) -> Vec<PrintToken> {
        match boundary {
            WindowFrameBoundary::UnboundedPreceding => {
                vec![PrintToken::keyword("unbounded preceding")]
            }
            WindowFrameBoundary::UnboundedFollowing => {
                vec![PrintToken::keyword("unbounded following")]
            }
            WindowFrameBoundary::CurrentRow => vec![PrintToken::keyword("current row")],
            WindowFrameBoundary::Preceding(offset) => {
                let mut tokens = self.value_tokens(offset);
                tokens.push(PrintToken::keyword("preceding"));
                tokens
            }
            WindowFrameBoundary::Following(offset) => {
                let mut tokens = self.value_tokens(offset);
                tokens.push(PrintToken::keyword("following"));
                tokens
            }
        }
    }

    fn case_tokens(&mut self, case: &CaseExpression) -> Vec<PrintToken> {
        let mut tokens = vec![PrintToken::keyword("case")];
        if let Some(operand) = &case.operand {
            tokens.extend(self.value_tokens(operand));
        }
        for pair in &case.switch.pairs {
            tokens.push(PrintToken::keyword("when"));
            tokens.extend(self.value_tokens(&pair.key));
            tokens.push(PrintToken::keyword("then"));
            tokens.extend(self.value_tokens(&pair.value));
        }
        if let Some(else_value) = &case.switch.else_value {
            tokens.push(PrintToken::keyword("else"));
            tokens.extend(self.value_tokens(else_value));
        }
        tokens.push(PrintToken::keyword("end"));
        vec![PrintToken::container(ContainerKind::CaseExpr, tokens)]
    }

    fn order_by_item_list(&mut self, items: &[OrderByItem]) -> Vec<PrintToken> {
        let mut tokens = Vec::new();
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                tokens.push(PrintToken::comma());
            }
            tokens.extend(self.value_tokens(&item.expr));
            match item.direction {
                Some(OrderDirection::Asc) => tokens.push(PrintToken::keyword("asc")),
                Some(OrderDirection::Desc) => tokens.push(PrintToken::keyword("desc")),
                None => {}
            }
            match item.nulls {
                Some(NullsOrder::First) => tokens.push(PrintToken::keyword("nulls first")),
                Some(NullsOrder::Last) => tokens.push(PrintToken::keyword("nulls last")),
                None => {}
            }
        }
        tokens
    }

    /// Select query tokens without the statement wrapper.
    pub(crate) fn select_query_tokens(&mut self, query: &SelectQuery) -> Vec<PrintToken> {
        match query {
            SelectQuery::Simple(simple) => self.simple_select_tokens(simple),
            SelectQuery::Binary(binary) => self.binary_select_tokens(binary),
            SelectQuery::Values(values) => vec![self.values_clause(values)],
        }
    }

    fn binary_select_tokens(&mut self, binary: &BinarySelectQuery) -> Vec<PrintToken> {
        let mut tokens = self.select_query_tokens(&binary.left);
        tokens.push(PrintToken::keyword(binary.operator.phrase()));
        tokens.extend(self.select_query_tokens(&binary.right));
        tokens
    }

    fn values_clause(&mut self, values: &ValuesQuery) -> PrintToken {
        let mut tokens = self.comment_tokens(&values.comments, CommentLevel::Clause);
        tokens.push(PrintToken::keyword("values"));
        for (i, row) in values.rows.iter().enumerate() {
            if i > 0 {
                tokens.push(PrintToken::comma());
            }
            tokens.push(PrintToken::open("("));
            self.push_comma_list(&mut tokens, row);
            tokens.push(PrintToken::close(")"));
        }
        PrintToken::container(ContainerKind::ValuesClause, tokens)
    }

    fn simple_select_tokens(&mut self, query: &SimpleSelectQuery) -> Vec<PrintToken> {
        let mut tokens = Vec::new();
        if let Some(with) = &query.with {
            tokens.push(self.with_clause_tokens(with));
        }

        let mut select = self.comment_tokens(&query.select.comments, CommentLevel::Clause);
        select.push(PrintToken::keyword("select"));
        match &query.select.distinct {
            Some(Distinct::Distinct) => select.push(PrintToken::keyword("distinct")),
            Some(Distinct::DistinctOn(exprs)) => {
                select.push(PrintToken::keyword("distinct on"));
                select.push(PrintToken::open("("));
                self.push_comma_list(&mut select, exprs);
                select.push(PrintToken::close(")"));
            }
            None => {}
        }
        for (i, item) in query.select.items.iter().enumerate() {
            if i > 0 {
                select.push(PrintToken::comma());
            }
            select.push(self.select_item_tokens(item));
        }
        tokens.push(PrintToken::container(ContainerKind::SelectClause, select));

        if let Some(from) = &query.from {
            tokens.extend(self.from_clause_tokens(from));
        }
        if let Some(where_clause) = &query.where_clause {
            let mut inner = self.comment_tokens(&where_clause.comments, CommentLevel::Clause);
            inner.push(PrintToken::keyword("where"));
            inner.extend(self.value_tokens(&where_clause.condition));
            tokens.push(PrintToken::container(ContainerKind::WhereClause, inner));
        }
        if let Some(group_by) = &query.group_by {
            let mut inner = self.comment_tokens(&group_by.comments, CommentLevel::Clause);
            inner.push(PrintToken::keyword("group by"));
            self.push_comma_list(&mut inner, &group_by.items);
            tokens.push(PrintToken::container(ContainerKind::GroupByClause, inner));
        }
        if let Some(having) = &query.having {
            let mut inner = self.comment_tokens(&having.comments, CommentLevel::Clause);
            inner.push(PrintToken::keyword("having"));
            inner.extend(self.value_tokens(&having.condition));
            tokens.push(PrintToken::container(ContainerKind::HavingClause, inner));
        }
        if let Some(window) = &query.window {
            let mut inner = self.comment_tokens(&window.comments, CommentLevel::Clause);
            inner.push(PrintToken::keyword("window"));
            for (i, definition) in window.definitions.iter().enumerate() {
                if i > 0 {
                    inner.push(PrintToken::comma());
                }
                inner.push(self.ident(&definition.name));
                inner.push(PrintToken::keyword("as"));
                let spec = OverClause {
                    window_name: definition.spec.window_name.clone(),
                    ..definition.spec.clone()
                };
                inner.extend(self.over_tokens(&spec));
            }
            tokens.push(PrintToken::container(ContainerKind::WindowClause, inner));
        }
        if let Some(order_by) = &query.order_by {
            let mut inner = self.comment_tokens(&order_by.comments, CommentLevel::Clause);
            inner.push(PrintToken::keyword("order by"));
            inner.extend(self.order_by_item_list(&order_by.items));
            tokens.push(PrintToken::container(ContainerKind::OrderByClause, inner));
        }
        if let Some(limit) = &query.limit {
            let mut inner = vec![PrintToken::keyword("limit")];
            inner.extend(self.value_tokens(limit));
            tokens.push(PrintToken::container(ContainerKind::LimitClause, inner));
        }
        if let Some(offset) = &query.offset {
            let mut inner = vec![PrintToken::keyword("offset")];
            inner.extend(self.value_tokens(offset));
            tokens.push(PrintToken::container(ContainerKind::OffsetClause, inner));
        }
        if let Some(fetch) = &query.fetch {
            let mut inner = vec![PrintToken::keyword("fetch")];
            inner.push(PrintToken::keyword(match fetch.kind {
                FetchKind::First => "first",
                FetchKind::Next => "next",
            }));
            if let Some(count) = &fetch.count {
                inner.extend(self.value_tokens(count));
            }
            inner.push(PrintToken::keyword(if fetch.with_ties {
                "with ties"
            } else {
                "rows only"
            }));
            tokens.push(PrintToken::container(ContainerKind::FetchClause, inner));
        }
        if let Some(for_clause) = &query.for_clause {
            let mut inner = vec![PrintToken::keyword(for_clause.lock.as_str())];
            if for_clause.nowait {
                inner.push(PrintToken::keyword("nowait"));
            }
            if for_clause.skip_locked {
                inner.push(PrintToken::keyword("skip locked"));
            }
            tokens.push(PrintToken::container(ContainerKind::ForClause, inner));
        }
        tokens
    }

    fn select_item_tokens(&mut self, item: &SelectItem) -> PrintToken {
        let mut tokens = self.comment_tokens(&item.comments, CommentLevel::Item);
        tokens.extend(self.value_tokens(&item.expr));
        if let Some(alias) = &item.alias {
            tokens.push(PrintToken::keyword("as"));
            tokens.push(self.ident(alias));
        }
        tokens.extend(self.trailing_comment_tokens(&item.comments, CommentLevel::Item));
        PrintToken::container(ContainerKind::SelectItem, tokens)
    }

    fn with_clause_tokens(&mut self, with: &WithClause) -> PrintToken {
        let mut tokens = self.comment_tokens(&with.comments, CommentLevel::Clause);
        tokens.push(PrintToken::keyword("with"));
        if with.recursive {
            tokens.push(PrintToken::keyword("recursive"));
        }
        for (i, cte) in with.tables.iter().enumerate() {
            if i > 0 {
                tokens.push(PrintToken::comma());
            }
            tokens.push(self.common_table_tokens(cte));
        }
        PrintToken::container(ContainerKind::WithClause, tokens)
    }

    fn common_table_tokens(&mut self, cte: &CommonTable) -> PrintToken {
        let mut tokens = self.comment_tokens(&cte.comments, CommentLevel::Item);
        tokens.push(self.ident(&cte.alias.name));
        if let Some(columns) = &cte.alias.columns {
            tokens.push(PrintToken::open("("));
            for (i, column) in columns.iter().enumerate() {
                if i > 0 {
                    tokens.push(PrintToken::comma());
                }
                tokens.push(self.ident(column));
            }
            tokens.push(PrintToken::close(")"));
        }
        tokens.push(PrintToken::keyword("as"));
        match cte.materialized {
            Some(true) => tokens.push(PrintToken::keyword("materialized")),
            Some(false) => tokens.push(PrintToken::keyword("not materialized")),
            None => {}
        }
        tokens.push(PrintToken::open("("));
        match &cte.body {
            CteBody::Select(query) => tokens.extend(self.select_query_tokens(query)),
            CteBody::Insert(query) => tokens.extend(self.insert_tokens(query)),
            CteBody::Update(query) => tokens.extend(self.update_tokens(query)),
            CteBody::Delete(query) => tokens.extend(self.delete_tokens(query)),
            CteBody::Merge(query) => tokens.extend(self.merge_tokens(query)),
        }
        tokens.push(PrintToken::close(")"));
        PrintToken::container(ContainerKind::CommonTable, tokens)
    }

    fn from_clause_tokens(&mut self, from: &FromClause) -> Vec<PrintToken> {
        let mut inner = self.comment_tokens(&from.comments, CommentLevel::Clause);
        inner.push(PrintToken::keyword("from"));
        inner.extend(self.source_tokens(&from.source));
        let mut tokens = vec![PrintToken::container(ContainerKind::FromClause, inner)];
        for join in &from.joins {
            tokens.push(self.join_tokens(join));
        }
        tokens
    }

    fn join_tokens(&mut self, join: &JoinClause) -> PrintToken {
        let mut tokens = Vec::new();
        let phrase = if join.natural {
            format!("natural {}", join.join_type.as_str())
        } else if join.join_type == JoinType::Inner {
            "join".to_string()
        } else {
            join.join_type.as_str().to_string()
        };
        tokens.push(PrintToken::keyword(phrase));
        if join.lateral {
            tokens.push(PrintToken::keyword("lateral"));
        }
        tokens.extend(self.source_tokens(&join.source));
        match &join.condition {
            Some(JoinCondition::On(predicate)) => {
                tokens.push(PrintToken::keyword("on"));
                tokens.extend(self.value_tokens(predicate));
            }
            Some(JoinCondition::Using(columns)) => {
                tokens.push(PrintToken::keyword("using"));
                tokens.push(PrintToken::open("("));
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        tokens.push(PrintToken::comma());
                    }
                    tokens.push(self.ident(column));
                }
                tokens.push(PrintToken::close(")"));
            }
            None => {}
        }
        PrintToken::container(ContainerKind::JoinClause, tokens)
    }

    fn source_tokens(&mut self, source: &SourceExpression) -> Vec<PrintToken> {
        let mut tokens = match &source.source {
            TableSource::Table(name) => self.qualified_name_tokens(name),
            TableSource::SubQuery(query) => {
                let mut inner = vec![PrintToken::open("(")];
                inner.extend(self.select_query_tokens(query));
                inner.push(PrintToken::close(")"));
                vec![PrintToken::container(ContainerKind::SubQuery, inner)]
            }
            TableSource::Function(call) => self.function_tokens(call),
            TableSource::Values(values) => {
                let mut inner = vec![PrintToken::open("(")];
                inner.push(self.values_clause(values));
                inner.push(PrintToken::close(")"));
                vec![PrintToken::container(ContainerKind::SubQuery, inner)]
            }
        };
        if let Some(alias) = &source.alias {
            tokens.extend(self.alias_tokens(alias));
        }
        tokens
    }

    fn alias_tokens(&mut self, alias: &TableAlias) -> Vec<PrintToken> {
        let mut tokens = vec![PrintToken::keyword("as"), self.ident(&alias.name)];
        if let Some(columns) = &alias.columns {
            tokens.push(PrintToken::open("("));
            for (i, column) in columns.iter().enumerate() {
                if i > 0 {
                    tokens.push(PrintToken::comma());
                }
                tokens.push(self.ident(column));
            }
            tokens.push(PrintToken::close(")"));
        }
        tokens
    }

    fn returning_tokens(&mut self, returning: &Option<Vec<SelectItem>>) -> Vec<PrintToken> {
        let Some(items) = returning else {
            return Vec::new();
        };
        let mut inner = vec![PrintToken::keyword("returning")];
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                inner.push(PrintToken::comma());
            }
            inner.push(self.select_item_tokens(item));
        }
        vec![PrintToken::container(ContainerKind::ReturningClause, inner)]
    }

    pub(crate) fn insert_tokens(&mut self, query: &InsertQuery) -> Vec<PrintToken> {
        let mut tokens = Vec::new();
        if let Some(with) = &query.with {
            tokens.push(self.with_clause_tokens(with));
        }
        tokens.push(PrintToken::keyword("insert into"));
        tokens.extend(self.qualified_name_tokens(&query.target));
        if !query.columns.is_empty() {
            tokens.push(PrintToken::open("("));
            for (i, column) in query.columns.iter().enumerate() {
                if i > 0 {
                    tokens.push(PrintToken::comma());
                }
                tokens.push(self.ident(column));
            }
            tokens.push(PrintToken::close(")"));
        }
        match &query.source {
            InsertSource::Values(rows) => {
                let values = ValuesQuery {
                    comments: Comments::new(),
                    rows: rows.clone(),
                    column_aliases: None,
                };
                tokens.push(self.values_clause(&values));
            }
            InsertSource::Select(select) => tokens.extend(self.select_query_tokens(select)),
            InsertSource::DefaultValues => tokens.push(PrintToken::keyword("default values")),
        }
        tokens.extend(self.returning_tokens(&query.returning));
        tokens
    }

    fn set_items_tokens(&mut self, items: &[SetItem]) -> Vec<PrintToken> {
        let mut inner = vec![PrintToken::keyword("set")];
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                inner.push(PrintToken::comma());
            }
            inner.extend(self.qualified_name_tokens(&item.column));
            inner.push(PrintToken::operator("="));
            inner.extend(self.value_tokens(&item.value));
        }
        vec![PrintToken::container(ContainerKind::SetClause, inner)]
    }

    pub(crate) fn update_tokens(&mut self, query: &UpdateQuery) -> Vec<PrintToken> {
        let mut tokens = Vec::new();
        if let Some(with) = &query.with {
            tokens.push(self.with_clause_tokens(with));
        }
        tokens.push(PrintToken::keyword("update"));
        tokens.extend(self.qualified_name_tokens(&query.target));
        if let Some(alias) = &query.alias {
            tokens.extend(self.alias_tokens(alias));
        }
        tokens.extend(self.set_items_tokens(&query.set));
        if let Some(from) = &query.from {
            tokens.extend(self.from_clause_tokens(from));
        }
        if let Some(where_clause) = &query.where_clause {
            let mut inner = self.comment_tokens(&where_clause.comments, CommentLevel::Clause);
            inner.push(PrintToken::keyword("where"));
            inner.extend(self.value_tokens(&where_clause.condition));
            tokens.push(PrintToken::container(ContainerKind::WhereClause, inner));
        }
        tokens.extend(self.returning_tokens(&query.returning));
        tokens
    }

    pub(crate) fn delete_tokens(&mut self, query: &DeleteQuery) -> Vec<PrintToken> {
        let mut tokens = Vec::new();
        if let Some(with) = &query.with {
            tokens.push(self.with_clause_tokens(with));
        }
        tokens.push(PrintToken::keyword("delete from"));
        tokens.extend(self.qualified_name_tokens(&query.target));
        if let Some(alias) = &query.alias {
            tokens.extend(self.alias_tokens(alias));
        }
        if let Some(using) = &query.using {
            let mut inner = vec![PrintToken::keyword("using")];
            inner.extend(self.source_tokens(&using.source));
            for join in &using.joins {
                inner.push(PrintToken::comma());
                inner.extend(self.source_tokens(&join.source));
            }
            tokens.push(PrintToken::container(ContainerKind::FromClause, inner));
        }
        if let Some(where_clause) = &query.where_clause {
            let mut inner = self.comment_tokens(&where_clause.comments, CommentLevel::Clause);
            inner.push(PrintToken::keyword("where"));
            inner.extend(self.value_tokens(&where_clause.condition));
            tokens.push(PrintToken::container(ContainerKind::WhereClause, inner));
        }
        tokens.extend(self.returning_tokens(&query.returning));
        tokens
    }

    pub(crate) fn merge_tokens(&mut self, query: &MergeQuery) -> Vec<PrintToken> {
        let mut tokens = Vec::new();
        if let Some(with) = &query.with {
            tokens.push(self.with_clause_tokens(with));
        }
        tokens.push(PrintToken::keyword("merge into"));
        tokens.extend(self.qualified_name_tokens(&query.target));
        if let Some(alias) = &query.alias {
            tokens.extend(self.alias_tokens(alias));
        }
        tokens.push(PrintToken::keyword("using"));
        tokens.extend(self.source_tokens(&query.source));
        tokens.push(PrintToken::keyword("on"));
        tokens.extend(self.value_tokens(&query.on));
        for when in &query.when_clauses {
            let mut inner = vec![PrintToken::keyword(when.match_kind.as_str())];
            if let Some(condition) = &when.condition {
                inner.push(PrintToken::operator("and"));
                inner.extend(self.value_tokens(condition));
            }
            inner.push(PrintToken::keyword("then"));
            match &when.action {
                MergeAction::Update { set, where_clause } => {
                    inner.push(PrintToken::keyword("update"));
                    inner.extend(self.set_items_tokens(set));
                    if let Some(predicate) = where_clause {
                        inner.push(PrintToken::keyword("where"));
                        inner.extend(self.value_tokens(predicate));
                    }
                }
                MergeAction::Delete { where_clause } => {
                    inner.push(PrintToken::keyword("delete"));
                    if let Some(predicate) = where_clause {
                        inner.push(PrintToken::keyword("where"));
                        inner.extend(self.value_tokens(predicate));
                    }
                }
                MergeAction::Insert { columns, values } => {
                    inner.push(PrintToken::keyword("insert"));
                    if !columns.is_empty() {
                        inner.push(PrintToken::open("("));
                        for (i, column) in columns.iter().enumerate() {
                            if i > 0 {
                                inner.push(PrintToken::comma());
                            }
                            inner.push(self.ident(column));
                        }
                        inner.push(PrintToken::close(")"));
                    }
                    inner.push(PrintToken::keyword("values"));
                    inner.push(PrintToken::open("("));
                    self.push_comma_list(&mut inner, values);
                    inner.push(PrintToken::close(")"));
                }
                MergeAction::InsertDefaultValues => {
                    inner.push(PrintToken::keyword("insert default values"));
                }
                MergeAction::DoNothing => inner.push(PrintToken::keyword("do nothing")),
            }
            tokens.push(PrintToken::container(ContainerKind::WhenClause, inner));
        }
        tokens.extend(self.returning_tokens(&query.returning));
        tokens
    }

    fn create_table_tokens(&mut self, query: &CreateTableQuery) -> Vec<PrintToken> {
        let mut tokens = vec![PrintToken::keyword(if query.temporary {
            "create temporary table"
        } else {
            "create table"
        })];
        if query.if_not_exists {
            tokens.push(PrintToken::keyword("if not exists"));
        }
        tokens.extend(self.qualified_name_tokens(&query.name));
        if let Some(as_query) = &query.as_query {
            tokens.push(PrintToken::keyword("as"));
            tokens.extend(self.select_query_tokens(as_query));
            return tokens;
        }
        tokens.push(PrintToken::open("("));
        let mut first = true;
        for column in &query.columns {
            if !first {
                tokens.push(PrintToken::comma());
            }
            first = false;
            tokens.extend(self.column_def_tokens(column));
        }
        for (name, constraint) in &query.constraints {
            if !first {
                tokens.push(PrintToken::comma());
            }
            first = false;
            if let Some(name) = name {
                tokens.push(PrintToken::keyword("constraint"));
                tokens.push(self.ident(name));
            }
            tokens.extend(self.constraint_tokens(constraint));
        }
        tokens.push(PrintToken::close(")"));
        tokens
    }

    fn column_def_tokens(&mut self, column: &ColumnDef) -> Vec<PrintToken> {
        let mut tokens = vec![self.ident(&column.name)];
        tokens.extend(self.type_tokens(&column.data_type));
        if column.not_null {
            tokens.push(PrintToken::keyword("not null"));
        }
        if let Some(default) = &column.default {
            tokens.push(PrintToken::keyword("default"));
            tokens.extend(self.value_tokens(default));
        }
        if column.primary_key {
            tokens.push(PrintToken::keyword("primary key"));
        }
        if column.unique {
            tokens.push(PrintToken::keyword("unique"));
        }
        tokens
    }

    fn constraint_tokens(&mut self, constraint: &TableConstraint) -> Vec<PrintToken> {
        let mut tokens = Vec::new();
        let mut name_list = |tokens: &mut Vec<PrintToken>, names: &[String], builder: &Self| {
            tokens.push(PrintToken::open("("));
            for (i, name) in names.iter().enumerate() {
                if i > 0 {
                    tokens.push(PrintToken::comma());
                }
                tokens.push(builder.ident(name));
            }
            tokens.push(PrintToken::close(")"));
        };
        match constraint {
            TableConstraint::PrimaryKey(columns) => {
                tokens.push(PrintToken::keyword("primary key"));
                name_list(&mut tokens, columns, self);
            }
            TableConstraint::Unique(columns) => {
                tokens.push(PrintToken::keyword("unique"));
                name_list(&mut tokens, columns, self);
            }
            TableConstraint::ForeignKey {
                columns,
                references,
                ref_columns,
            } => {
                tokens.push(PrintToken::keyword("foreign key"));
                name_list(&mut tokens, columns, self);
                tokens.push(PrintToken::keyword("references"));
                tokens.extend(self.qualified_name_tokens(references));
                if !ref_columns.is_empty() {
                    name_list(&mut tokens, ref_columns, self);
                }
            }
            TableConstraint::Check(predicate) => {
                tokens.push(PrintToken::keyword("check"));
                tokens.push(PrintToken::open("("));
                tokens.extend(self.value_tokens(predicate));
                tokens.push(PrintToken::close(")"));
            }
        }
        tokens
    }

    fn create_index_tokens(&mut self, query: &CreateIndexQuery) -> Vec<PrintToken> {
        let mut tokens = vec![PrintToken::keyword(if query.unique {
            "create unique index"
        } else {
            "create index"
        })];
        if query.if_not_exists {
            tokens.push(PrintToken::keyword("if not exists"));
        }
        if let Some(name) = &query.name {
            tokens.push(self.ident(name));
        }
        tokens.push(PrintToken::keyword("on"));
        tokens.extend(self.qualified_name_tokens(&query.table));
        tokens.push(PrintToken::open("("));
        for (i, column) in query.columns.iter().enumerate() {
            if i > 0 {
                tokens.push(PrintToken::comma());
            }
            tokens.extend(self.value_tokens(&column.expr));
            match column.direction {
                Some(OrderDirection::Asc) => tokens.push(PrintToken::keyword("asc")),
                Some(OrderDirection::Desc) => tokens.push(PrintToken::keyword("desc")),
                None => {}
            }
        }
        tokens.push(PrintToken::close(")"));
        if let Some(where_clause) = &query.where_clause {
            tokens.push(PrintToken::keyword("where"));
            tokens.extend(self.value_tokens(where_clause));
        }
        tokens
    }

    fn create_schema_tokens(&mut self, query: &CreateSchemaQuery) -> Vec<PrintToken> {
        let mut tokens = vec![PrintToken::keyword("create schema")];
        if query.if_not_exists {
            tokens.push(PrintToken::keyword("if not exists"));
        }
        tokens.push(self.ident(&query.name));
        tokens
    }

    fn drop_tokens(&mut self, query: &DropObjectQuery) -> Vec<PrintToken> {
        let mut tokens = vec![PrintToken::keyword(format!("drop {}", query.kind.as_str()))];
        if query.if_exists {
            tokens.push(PrintToken::keyword("if exists"));
        }
        for (i, name) in query.names.iter().enumerate() {
            if i > 0 {
                tokens.push(PrintToken::comma());
            }
            tokens.extend(self.qualified_name_tokens(name));
        }
        match query.behavior {
            Some(DropBehavior::Cascade) => tokens.push(PrintToken::keyword("cascade")),
            Some(DropBehavior::Restrict) => tokens.push(PrintToken::keyword("restrict")),
            None => {}
        }
        tokens
    }

    fn alter_table_tokens(&mut self, query: &AlterTableQuery) -> Vec<PrintToken> {
        let mut tokens = vec![PrintToken::keyword("alter table")];
        tokens.extend(self.qualified_name_tokens(&query.name));
        for (i, action) in query.actions.iter().enumerate() {
            if i > 0 {
                tokens.push(PrintToken::comma());
            }
            match action {
                AlterTableAction::AddConstraint {
                    name,
                    if_not_exists,
                    constraint,
                    not_valid,
                } => {
                    tokens.push(PrintToken::keyword("add"));
                    if let Some(name) = name {
                        tokens.push(PrintToken::keyword("constraint"));
                        if *if_not_exists {
                            tokens.push(PrintToken::keyword("if not exists"));
                        }
                        tokens.push(self.ident(name));
                    }
                    tokens.extend(self.constraint_tokens(constraint));
                    if *not_valid {
                        tokens.push(PrintToken::keyword("not valid"));
                    }
                }
                AlterTableAction::DropConstraint {
                    if_exists,
                    name,
                    behavior,
                } => {
                    tokens.push(PrintToken::keyword("drop"));
                    tokens.push(PrintToken::keyword("constraint"));
                    if *if_exists {
                        tokens.push(PrintToken::keyword("if exists"));
                    }
                    tokens.push(self.ident(name));
                    match behavior {
                        Some(DropBehavior::Cascade) => tokens.push(PrintToken::keyword("cascade")),
                        Some(DropBehavior::Restrict) => {
                            tokens.push(PrintToken::keyword("restrict"));
                        }
                        None => {}
                    }
                }
                AlterTableAction::DropColumn {
                    if_exists,
                    name,
                    behavior,
                } => {
                    tokens.push(PrintToken::keyword("drop"));
                    tokens.push(PrintToken::keyword("column"));
                    if *if_exists {
                        tokens.push(PrintToken::keyword("if exists"));
                    }
                    tokens.push(self.ident(name));
                    match behavior {
                        Some(DropBehavior::Cascade) => tokens.push(PrintToken::keyword("cascade")),
                        Some(DropBehavior::Restrict) => {
                            tokens.push(PrintToken::keyword("restrict"));
                        }
                        None => {}
                    }
                }
                AlterTableAction::AlterColumnSetDefault { column, default } => {
                    tokens.push(PrintToken::keyword("alter column"));
                    tokens.push(self.ident(column));
                    tokens.push(PrintToken::keyword("set default"));
                    tokens.extend(self.value_tokens(default));
                }
                AlterTableAction::AlterColumnDropDefault { column } => {
                    tokens.push(PrintToken::keyword("alter column"));
                    tokens.push(self.ident(column));
                    tokens.push(PrintToken::keyword("drop default"));
                }
            }
        }
        tokens
    }

    fn comment_on_tokens(&mut self, query: &CommentOnQuery) -> Vec<PrintToken> {
        let mut tokens = vec![
            PrintToken::keyword("comment on"),
            PrintToken::keyword(query.target_kind.as_str()),
        ];
        tokens.extend(self.qualified_name_tokens(&query.target));
        tokens.push(PrintToken::operator("is"));
        match &query.text {
            Some(text) => tokens.push(PrintToken::value(text)),
            None => tokens.push(PrintToken::keyword("null")),
        }
        tokens
    }

    fn explain_tokens(&mut self, query: &ExplainQuery) -> Vec<PrintToken> {
        let mut tokens = vec![PrintToken::keyword("explain")];
        if query.analyze {
            tokens.push(PrintToken::keyword("analyze"));
        }
        if query.verbose {
            tokens.push(PrintToken::keyword("verbose"));
        }
        tokens.push(self.build_statement(&query.statement));
        tokens
    }

    fn vacuum_tokens(&mut self, query: &VacuumQuery) -> Vec<PrintToken> {
        let mut tokens = vec![PrintToken::keyword("vacuum")];
        if query.full {
            tokens.push(PrintToken::keyword("full"));
        }
        if query.analyze {
            tokens.push(PrintToken::keyword("analyze"));
        }
        for (i, table) in query.tables.iter().enumerate() {
            if i > 0 {
                tokens.push(PrintToken::comma());
            }
            tokens.extend(self.qualified_name_tokens(table));
        }
        tokens
    }

    fn checkpoint_tokens(&mut self, _query: &CheckpointQuery) -> Vec<PrintToken> {
        vec![PrintToken::keyword("checkpoint")]
    }
}

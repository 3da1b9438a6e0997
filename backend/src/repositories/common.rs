//! Shared repository utilities.

use sqlx::{Postgres, QueryBuilder};

use crate::models::user::UserFilter;

/// Appends WHERE or AND to the query builder depending on whether a clause has already been added.
pub fn push_clause(builder: &mut QueryBuilder<'_, Postgres>, has_clause: &mut bool) {
    if *has_clause {
        builder.push(" AND ");
    } else {
        builder.push(" WHERE ");
        *has_clause = true;
    }
}

/// Appends the WHERE clauses for a user listing filter.
pub fn push_user_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    let mut has_clause = false;
    if let Some(email) = &filter.email {
        push_clause(builder, &mut has_clause);
        builder.push("email = ").push_bind(email.clone());
    }
    if let Some(name) = &filter.name {
        push_clause(builder, &mut has_clause);
        builder
            .push("name ILIKE ")
            .push_bind(format!("%{}%", escape_like(name)));
    }
    if let Some(role) = filter.role {
        push_clause(builder, &mut has_clause);
        builder.push("role = ").push_bind(role.as_str());
    }
    if let Some(is_active) = filter.is_active {
        push_clause(builder, &mut has_clause);
        builder.push("is_active = ").push_bind(is_active);
    }
}

fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;

    #[test]
    fn push_clause_switches_between_where_and_and() {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT 1");
        let mut has_clause = false;

        push_clause(&mut builder, &mut has_clause);
        builder.push("a = 1");
        push_clause(&mut builder, &mut has_clause);
        builder.push("b = 2");

        assert_eq!(builder.sql(), "SELECT 1 WHERE a = 1 AND b = 2");
    }

    #[test]
    fn user_filter_renders_all_clauses() {
        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM users");
        let filter = UserFilter {
            email: Some("a@b.com".into()),
            name: Some("al".into()),
            role: Some(UserRole::Admin),
            is_active: Some(true),
        };
        push_user_filter(&mut builder, &filter);
        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM users WHERE email = $1 AND name ILIKE $2 AND role = $3 AND is_active = $4"
        );
    }

    #[test]
    fn empty_filter_adds_nothing() {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT 1");
        push_user_filter(&mut builder, &UserFilter::default());
        assert_eq!(builder.sql(), "SELECT 1");
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
    }
}

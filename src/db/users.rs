//! User account CRUD operations

use diesel::prelude::*;
use uuid::Uuid;

use super::models::{current_timestamp, NewUser, User};
use super::schema::users;
use crate::types::{CompassError, Result};

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct CreateUserInput<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub is_mentor: bool,
}

/// Look up a user by id
pub fn get_user(conn: &mut SqliteConnection, id: &str) -> Result<Option<User>> {
    users::table
        .filter(users::id.eq(id))
        .first(conn)
        .optional()
        .map_err(|e| CompassError::Database(format!("Query failed: {e}")))
}

/// Look up a user by email (case-preserving exact match)
pub fn get_user_by_email(conn: &mut SqliteConnection, email: &str) -> Result<Option<User>> {
    users::table
        .filter(users::email.eq(email))
        .first(conn)
        .optional()
        .map_err(|e| CompassError::Database(format!("Query failed: {e}")))
}

/// Create a user. Returns Conflict if the email is already registered.
pub fn create_user(conn: &mut SqliteConnection, input: CreateUserInput<'_>) -> Result<User> {
    if get_user_by_email(conn, input.email)?.is_some() {
        return Err(CompassError::Conflict(
            "An account with this email already exists".into(),
        ));
    }

    let id = Uuid::new_v4().to_string();
    let now = current_timestamp();

    let new_user = NewUser {
        id: &id,
        name: input.name,
        email: input.email,
        password_hash: input.password_hash,
        role: if input.is_mentor { "mentor" } else { "client" },
        is_mentor: if input.is_mentor { 1 } else { 0 },
        created_at: &now,
        updated_at: &now,
    };

    diesel::insert_into(users::table)
        .values(&new_user)
        .execute(conn)
        .map_err(|e| CompassError::Database(format!("Insert failed: {e}")))?;

    get_user(conn, &id)?
        .ok_or_else(|| CompassError::Internal("Failed to retrieve created user".into()))
}

/// Ensure a user row with a fixed id exists (skip-auth mock user). Returns
/// the existing row when present.
pub fn ensure_user_with_id(
    conn: &mut SqliteConnection,
    id: &str,
    input: CreateUserInput<'_>,
) -> Result<User> {
    if let Some(existing) = get_user(conn, id)? {
        return Ok(existing);
    }

    let now = current_timestamp();
    let new_user = NewUser {
        id,
        name: input.name,
        email: input.email,
        password_hash: input.password_hash,
        role: if input.is_mentor { "mentor" } else { "client" },
        is_mentor: if input.is_mentor { 1 } else { 0 },
        created_at: &now,
        updated_at: &now,
    };

    diesel::insert_into(users::table)
        .values(&new_user)
        .execute(conn)
        .map_err(|e| CompassError::Database(format!("Insert failed: {e}")))?;

    get_user(conn, id)?
        .ok_or_else(|| CompassError::Internal("Failed to retrieve created user".into()))
}

/// Update name and/or email. Returns Conflict when the new email belongs to
/// another account.
pub fn update_profile(
    conn: &mut SqliteConnection,
    id: &str,
    name: Option<&str>,
    email: Option<&str>,
) -> Result<User> {
    if let Some(new_email) = email {
        if let Some(existing) = get_user_by_email(conn, new_email)? {
            if existing.id != id {
                return Err(CompassError::Conflict(
                    "An account with this email already exists".into(),
                ));
            }
        }
    }

    let now = current_timestamp();
    conn.transaction(|conn| {
        if let Some(name) = name {
            diesel::update(users::table.filter(users::id.eq(id)))
                .set((users::name.eq(name), users::updated_at.eq(&now)))
                .execute(conn)?;
        }
        if let Some(email) = email {
            diesel::update(users::table.filter(users::id.eq(id)))
                .set((users::email.eq(email), users::updated_at.eq(&now)))
                .execute(conn)?;
        }
        diesel::result::QueryResult::Ok(())
    })
    .map_err(|e| CompassError::Database(format!("Update failed: {e}")))?;

    get_user(conn, id)?.ok_or_else(|| CompassError::NotFound(format!("User {id} not found")))
}

/// Replace the stored password hash
pub fn update_password_hash(
    conn: &mut SqliteConnection,
    id: &str,
    password_hash: &str,
) -> Result<()> {
    let updated = diesel::update(users::table.filter(users::id.eq(id)))
        .set((
            users::password_hash.eq(password_hash),
            users::updated_at.eq(current_timestamp()),
        ))
        .execute(conn)
        .map_err(|e| CompassError::Database(format!("Update failed: {e}")))?;

    if updated == 0 {
        return Err(CompassError::NotFound(format!("User {id} not found")));
    }
    Ok(())
}

/// Delete a user and every row they own, in one transaction.
pub fn delete_account(conn: &mut SqliteConnection, id: &str) -> Result<()> {
    use super::schema::{
        action_plans, ai_analysis_reports, chat_messages, client_data_access_permissions, goals,
        logs, mentor_client_relationships, mentor_notes, notifications, reflections, tasks,
    };

    conn.transaction(|conn| {
        // Permission rows hang off relationships, which exist on both the
        // mentor and client side; collect the ids before the rows go away.
        let relationship_ids: Vec<String> = mentor_client_relationships::table
            .filter(
                mentor_client_relationships::mentor_id
                    .eq(id)
                    .or(mentor_client_relationships::client_id.eq(id)),
            )
            .select(mentor_client_relationships::id)
            .load(conn)?;

        diesel::delete(tasks::table.filter(tasks::user_id.eq(id))).execute(conn)?;
        diesel::delete(goals::table.filter(goals::user_id.eq(id))).execute(conn)?;
        diesel::delete(logs::table.filter(logs::user_id.eq(id))).execute(conn)?;
        diesel::delete(reflections::table.filter(reflections::user_id.eq(id))).execute(conn)?;
        diesel::delete(ai_analysis_reports::table.filter(ai_analysis_reports::user_id.eq(id)))
            .execute(conn)?;
        diesel::delete(action_plans::table.filter(action_plans::user_id.eq(id))).execute(conn)?;
        diesel::delete(chat_messages::table.filter(chat_messages::user_id.eq(id))).execute(conn)?;
        diesel::delete(notifications::table.filter(notifications::user_id.eq(id)))
            .execute(conn)?;
        diesel::delete(
            client_data_access_permissions::table.filter(
                client_data_access_permissions::client_id
                    .eq(id)
                    .or(client_data_access_permissions::relationship_id.eq_any(&relationship_ids)),
            ),
        )
        .execute(conn)?;
        diesel::delete(
            mentor_notes::table.filter(
                mentor_notes::mentor_id
                    .eq(id)
                    .or(mentor_notes::client_id.eq(id)),
            ),
        )
        .execute(conn)?;
        diesel::delete(
            mentor_client_relationships::table.filter(
                mentor_client_relationships::mentor_id
                    .eq(id)
                    .or(mentor_client_relationships::client_id.eq(id)),
            ),
        )
        .execute(conn)?;
        diesel::delete(users::table.filter(users::id.eq(id))).execute(conn)?;
        diesel::result::QueryResult::Ok(())
    })
    .map_err(|e| CompassError::Database(format!("Account deletion failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Db;

    #[test]
    fn test_create_and_lookup() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();

        let user = create_user(
            &mut conn,
            CreateUserInput {
                name: "Aki",
                email: "aki@example.com",
                password_hash: "$argon2$fake",
                is_mentor: false,
            },
        )
        .unwrap();

        assert_eq!(user.role, "client");
        assert_eq!(user.is_mentor, 0);

        let found = get_user_by_email(&mut conn, "aki@example.com").unwrap().unwrap();
        assert_eq!(found.id, user.id);
    }

    #[test]
    fn test_duplicate_email_conflict() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();

        let input = CreateUserInput {
            name: "A",
            email: "dup@example.com",
            password_hash: "h",
            is_mentor: false,
        };
        create_user(&mut conn, input.clone()).unwrap();

        let err = create_user(&mut conn, input).unwrap_err();
        assert!(matches!(err, CompassError::Conflict(_)));
    }

    #[test]
    fn test_update_profile_email_conflict() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();

        create_user(
            &mut conn,
            CreateUserInput {
                name: "A",
                email: "a@example.com",
                password_hash: "h",
                is_mentor: false,
            },
        )
        .unwrap();
        let b = create_user(
            &mut conn,
            CreateUserInput {
                name: "B",
                email: "b@example.com",
                password_hash: "h",
                is_mentor: false,
            },
        )
        .unwrap();

        let err = update_profile(&mut conn, &b.id, None, Some("a@example.com")).unwrap_err();
        assert!(matches!(err, CompassError::Conflict(_)));

        // Re-submitting your own email is not a conflict
        let same = update_profile(&mut conn, &b.id, Some("Bea"), Some("b@example.com")).unwrap();
        assert_eq!(same.name, "Bea");
    }

    #[test]
    fn test_delete_account_removes_owned_rows() {
        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();

        let user = create_user(
            &mut conn,
            CreateUserInput {
                name: "A",
                email: "gone@example.com",
                password_hash: "h",
                is_mentor: false,
            },
        )
        .unwrap();

        let goal = crate::db::goals::create_goal(
            &mut conn,
            &user.id,
            crate::db::goals::CreateGoalInput {
                title: "Learn".into(),
                description: None,
                target_date: None,
            },
        )
        .unwrap();
        crate::db::tasks::create_task(
            &mut conn,
            &user.id,
            &goal.id,
            crate::db::tasks::CreateTaskInput {
                title: "Step 1".into(),
                due_date: None,
            },
        )
        .unwrap();

        delete_account(&mut conn, &user.id).unwrap();

        assert!(get_user(&mut conn, &user.id).unwrap().is_none());
        assert!(crate::db::goals::list_goals(&mut conn, &user.id).unwrap().is_empty());
        assert!(crate::db::tasks::list_tasks_for_goal(&mut conn, &goal.id)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_delete_mentor_account_removes_permission_rows() {
        use crate::db::permissions::{upsert_flags, PermissionFlags};
        use crate::db::relationships;
        use crate::db::schema::client_data_access_permissions;

        let db = Db::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();

        let mentor = create_user(
            &mut conn,
            CreateUserInput {
                name: "M",
                email: "mentor@example.com",
                password_hash: "h",
                is_mentor: true,
            },
        )
        .unwrap();
        let client = create_user(
            &mut conn,
            CreateUserInput {
                name: "C",
                email: "client@example.com",
                password_hash: "h",
                is_mentor: false,
            },
        )
        .unwrap();

        let invite = relationships::create_invite(&mut conn, &mentor.id, &client.id).unwrap();
        let rel = relationships::accept_invite(&mut conn, &invite.id, &client.id).unwrap();

        let flags = PermissionFlags {
            allow_goals: true,
            ..PermissionFlags::deny_all()
        };
        upsert_flags(&mut conn, &rel, flags).unwrap();

        // Deleting the mentor side must not leave permission rows pointing
        // at the removed relationship
        delete_account(&mut conn, &mentor.id).unwrap();

        let remaining: i64 = client_data_access_permissions::table
            .filter(client_data_access_permissions::relationship_id.eq(&rel.id))
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(remaining, 0);

        // The client account itself is untouched
        assert!(get_user(&mut conn, &client.id).unwrap().is_some());
    }
}

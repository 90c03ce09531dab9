diesel::table! {
    users (id) {
        id -> Text,
        name -> Text,
        email -> Text,
        password_hash -> Text,
        role -> Text,
        is_mentor -> Integer,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    mentor_client_relationships (id) {
        id -> Text,
        mentor_id -> Text,
        client_id -> Text,
        status -> Text,
        invited_at -> Text,
        accepted_at -> Nullable<Text>,
    }
}

diesel::table! {
    client_data_access_permissions (id) {
        id -> Text,
        relationship_id -> Text,
        client_id -> Text,
        allow_goals -> Integer,
        allow_tasks -> Integer,
        allow_logs -> Integer,
        allow_reflections -> Integer,
        allow_ai_reports -> Integer,
        is_active -> Integer,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    goals (id) {
        id -> Text,
        user_id -> Text,
        title -> Text,
        description -> Nullable<Text>,
        status -> Text,
        target_date -> Nullable<Text>,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    tasks (id) {
        id -> Text,
        goal_id -> Text,
        user_id -> Text,
        title -> Text,
        status -> Text,
        due_date -> Nullable<Text>,
        completed_at -> Nullable<Text>,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    logs (id) {
        id -> Text,
        user_id -> Text,
        content -> Text,
        mood -> Nullable<Text>,
        logged_at -> Text,
        created_at -> Text,
    }
}

diesel::table! {
    reflections (id) {
        id -> Text,
        user_id -> Text,
        period_start -> Text,
        period_end -> Text,
        went_well -> Text,
        to_improve -> Text,
        next_actions -> Text,
        created_at -> Text,
    }
}

diesel::table! {
    ai_analysis_reports (id) {
        id -> Text,
        user_id -> Text,
        reflection_id -> Nullable<Text>,
        summary -> Text,
        strengths -> Text,
        improvements -> Text,
        suggestions -> Text,
        created_at -> Text,
    }
}

diesel::table! {
    action_plans (id) {
        id -> Text,
        user_id -> Text,
        report_id -> Nullable<Text>,
        title -> Text,
        items_json -> Text,
        status -> Text,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    mentor_notes (id) {
        id -> Text,
        mentor_id -> Text,
        client_id -> Text,
        content -> Text,
        created_at -> Text,
    }
}

diesel::table! {
    data_view_logs (id) {
        id -> Text,
        mentor_id -> Text,
        client_id -> Text,
        data_type -> Text,
        record_ids_json -> Text,
        action -> Text,
        created_at -> Text,
    }
}

diesel::table! {
    notifications (id) {
        id -> Text,
        user_id -> Text,
        kind -> Text,
        message -> Text,
        read -> Integer,
        created_at -> Text,
    }
}

diesel::table! {
    chat_messages (id) {
        id -> Text,
        user_id -> Text,
        mode -> Text,
        role -> Text,
        content -> Text,
        created_at -> Text,
    }
}

diesel::joinable!(tasks -> goals (goal_id));
diesel::joinable!(client_data_access_permissions -> mentor_client_relationships (relationship_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    mentor_client_relationships,
    client_data_access_permissions,
    goals,
    tasks,
    logs,
    reflections,
    ai_analysis_reports,
    action_plans,
    mentor_notes,
    data_view_logs,
    notifications,
    chat_messages,
);

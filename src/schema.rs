diesel::table! {
    notes (id) {
        id -> Int8,
        title -> Text,
        content -> Text,
        tags -> Array<Text>,
        important -> Bool,
        deleted -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

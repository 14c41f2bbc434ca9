// Kept in sync with `db::SCHEMA` by hand.

diesel::table! {
    samples (id) {
        id -> Integer,
        source -> Text,
        timestamp -> BigInt,
        temp_outside_f -> Nullable<Double>,
        temp_indoor_ref_f -> Nullable<Double>,
        rain_daily_raw -> Nullable<Integer>,
        rain_rate_raw -> Nullable<Integer>,
        temp_c -> Nullable<Double>,
        temp_c_min -> Nullable<Double>,
        temp_c_max -> Nullable<Double>,
    }
}

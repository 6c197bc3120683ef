use chrono::{DateTime, SubsecRound, Utc};

/// Current time at the precision PostgreSQL keeps for `TIMESTAMPTZ`.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

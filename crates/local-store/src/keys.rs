//! Storage key constants.

/// Keys written to the local store.
pub struct StorageKeys;

impl StorageKeys {
    /// Monthly income goal (JSON number)
    pub const MONTHLY_TARGET: &'static str = "monthlyTarget";

    /// Income achieved so far this month (JSON number)
    pub const ACHIEVED_THIS_MONTH: &'static str = "achievedThisMonth";

    /// Task list (JSON array)
    pub const TASKS: &'static str = "incomeInsightsTasks";

    /// Theme preference, `"dark"` or `"light"` (plain string)
    pub const THEME: &'static str = "theme";

    /// Signed-in principal (JSON object)
    pub const AUTH_USER: &'static str = "authUser";

    /// Identity provider refresh token (plain string)
    pub const AUTH_REFRESH_TOKEN: &'static str = "authRefreshToken";
}

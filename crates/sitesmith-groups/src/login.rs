/// Strips the domain prefix from a login identity.
///
/// Everything up to and including the last `\` is dropped, so `CORP\jdoe`
/// yields `jdoe`. Logins without a separator come back unchanged.
pub fn corp_id(login_name: &str) -> &str {
    login_name
        .rsplit_once('\\')
        .map_or(login_name, |(_, account)| account)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corp_id() {
        assert_eq!(corp_id("DOMAIN\\jdoe"), "jdoe");
        assert_eq!(corp_id("jdoe"), "jdoe");
        assert_eq!(corp_id("i:0#.w|CORP\\sub\\jdoe"), "jdoe");
        assert_eq!(corp_id("CORP\\"), "");
    }
}

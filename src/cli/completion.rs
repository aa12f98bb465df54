//! Shell completion generation for sumoql
//!
//! Generates completion scripts for bash, zsh and fish, with dynamic
//! completion of profile names read from the configuration file.

use clap::CommandFactory;
use clap_complete::{Shell, generate};

use crate::cli::CliArgs;
use crate::error::{ConfigError, Result};

const BIN_NAME: &str = "sumoql";

/// Generate shell completion script
///
/// # Arguments
/// * `shell_name` - Shell type (bash, zsh, fish)
///
/// # Returns
/// * `Result<String>` - Completion script
pub fn generate_completion(shell_name: &str) -> Result<String> {
    let shell = parse_shell(shell_name)?;
    let base = base_completion(shell);

    let script = match shell {
        Shell::Bash => bash_profile_completion(&base),
        Shell::Zsh => zsh_profile_completion(&base),
        Shell::Fish => fish_profile_completion(&base),
        _ => return Err(ConfigError::UnsupportedShell(shell_name.to_string()).into()),
    };
    Ok(script)
}

/// Parse shell name string to Shell enum
fn parse_shell(shell_name: &str) -> Result<Shell> {
    match shell_name.to_lowercase().as_str() {
        "bash" => Ok(Shell::Bash),
        "zsh" => Ok(Shell::Zsh),
        "fish" => Ok(Shell::Fish),
        _ => Err(ConfigError::UnsupportedShell(shell_name.to_string()).into()),
    }
}

fn base_completion(shell: Shell) -> String {
    let mut cmd = CliArgs::command();
    let mut buffer = Vec::new();
    generate(shell, &mut cmd, BIN_NAME, &mut buffer);
    String::from_utf8_lossy(&buffer).into_owned()
}

fn bash_profile_completion(base: &str) -> String {
    format!(
        r#"{base}

_sumoql_list_profiles() {{
    sumoql config --list-profiles 2>/dev/null
}}

_sumoql_enhanced() {{
    local cur prev words cword
    _init_completion || return

    if [[ "$prev" == "--profile" ]]; then
        COMPREPLY=($(compgen -W "$(_sumoql_list_profiles)" -- "$cur"))
        return 0
    fi

    _sumoql "$@"
}}

complete -F _sumoql_enhanced sumoql
"#
    )
}

fn zsh_profile_completion(base: &str) -> String {
    format!(
        r#"{base}

_sumoql_profiles() {{
    local -a profiles
    profiles=($(sumoql config --list-profiles 2>/dev/null))
    _describe 'profiles' profiles
}}

_sumoql_enhanced() {{
    if [[ ${{words[CURRENT-1]}} == "--profile" ]]; then
        _sumoql_profiles
        return 0
    fi
    _sumoql "$@"
}}

compdef _sumoql_enhanced sumoql
"#
    )
}

fn fish_profile_completion(base: &str) -> String {
    format!(
        r#"{base}

function __sumoql_list_profiles
    sumoql config --list-profiles 2>/dev/null
end

complete -c sumoql -l profile -f -a "(__sumoql_list_profiles)" -d "Profile name from config file"
"#
    )
}

//! Built-in validation suite for the kind + ArgoCD environment.
//!
//! Every check shells out to the same CLIs the setup scripts use. Nothing here
//! interprets Kubernetes state itself; exit codes are the only signal.

use crate::case::TestCase;
use crate::command::CommandPredicate;
use crate::config::ChecksConfig;
use crate::errors::Result;
use crate::eventual::Eventually;
use crate::registry::{Registry, TestGroup};

/// Group labels, in run order.
pub const GROUP_TOOLING: &str = "tooling";
pub const GROUP_CONNECTIVITY: &str = "cluster connectivity";
pub const GROUP_INSTALLATION: &str = "argocd installation";
pub const GROUP_APPLICATIONS: &str = "applications";
pub const GROUP_SECURITY: &str = "security";

/// Build the default registry.
///
/// # Errors
///
/// Propagates `ValidatorError::EmptyCaseName` from case construction.
pub fn default_registry(config: &ChecksConfig) -> Result<Registry> {
    Ok(Registry::new()
        .with_group(tooling(config)?)
        .with_group(connectivity(config)?)
        .with_group(installation(config)?)
        .with_group(applications(config)?)
        .with_group(security(config)?))
}

fn cmd(config: &ChecksConfig, args: &[&str]) -> CommandPredicate {
    CommandPredicate::argv(args.iter().copied()).with_timeout(config.command_timeout)
}

/// Run a fixed `sh -c` script with config values bound to `$1`, `$2`, ...
///
/// Values never become part of the script text.
fn script(config: &ChecksConfig, body: &str, args: &[&str]) -> CommandPredicate {
    let argv = ["sh", "-c", body, "sh"].into_iter().chain(args.iter().copied());
    CommandPredicate::argv(argv).with_timeout(config.command_timeout)
}

fn tooling(config: &ChecksConfig) -> Result<TestGroup> {
    Ok(TestGroup::new(GROUP_TOOLING)
        .with_case(TestCase::expect_success(
            "kind is installed",
            cmd(config, &["kind", "version"]),
        )?)
        .with_case(TestCase::expect_success(
            "kubectl is installed",
            cmd(config, &["kubectl", "version", "--client"]),
        )?)
        .with_case(TestCase::expect_success(
            "helm is installed",
            cmd(config, &["helm", "version"]),
        )?)
        .with_case(TestCase::expect_success(
            "argocd CLI is installed",
            cmd(config, &["argocd", "version", "--client"]),
        )?))
}

fn connectivity(config: &ChecksConfig) -> Result<TestGroup> {
    let context = format!("kind-{}", config.cluster_name);
    let node_timeout = format!("--timeout={}s", config.command_timeout.as_secs());

    Ok(TestGroup::new(GROUP_CONNECTIVITY)
        .with_case(TestCase::expect_success(
            format!("kind cluster '{}' exists", config.cluster_name),
            script(
                config,
                r#"kind get clusters | grep -qxF -- "$1""#,
                &[&config.cluster_name],
            ),
        )?)
        .with_case(TestCase::expect_success(
            "kubectl can reach the cluster",
            cmd(config, &["kubectl", "cluster-info", "--context", &context]),
        )?)
        .with_case(TestCase::expect_success(
            "all nodes are Ready",
            cmd(
                config,
                &[
                    "kubectl",
                    "wait",
                    "--for=condition=Ready",
                    "nodes",
                    "--all",
                    &node_timeout,
                ],
            ),
        )?))
}

fn installation(config: &ChecksConfig) -> Result<TestGroup> {
    let ns = config.argocd_namespace.as_str();
    let rollout_timeout = format!("--timeout={}s", config.command_timeout.as_secs());

    let mut group = TestGroup::new(GROUP_INSTALLATION)
        .with_case(TestCase::expect_success(
            format!("namespace '{ns}' exists"),
            cmd(config, &["kubectl", "get", "namespace", ns]),
        )?)
        .with_case(TestCase::expect_success(
            "Application CRD is registered",
            cmd(
                config,
                &["kubectl", "get", "crd", "applications.argoproj.io"],
            ),
        )?);

    for workload in [
        "deployment/argocd-server",
        "deployment/argocd-repo-server",
        "statefulset/argocd-application-controller",
    ] {
        group.push(TestCase::expect_success(
            format!("{workload} is rolled out"),
            cmd(
                config,
                &[
                    "kubectl",
                    "-n",
                    ns,
                    "rollout",
                    "status",
                    workload,
                    &rollout_timeout,
                ],
            ),
        )?);
    }

    Ok(group)
}

fn applications(config: &ChecksConfig) -> Result<TestGroup> {
    let ns = config.argocd_namespace.as_str();
    let mut group = TestGroup::new(GROUP_APPLICATIONS).with_case(TestCase::expect_success(
        "Application resources can be listed",
        cmd(config, &["kubectl", "-n", ns, "get", "applications.argoproj.io"]),
    )?);

    for app in &config.applications {
        group.push(TestCase::expect_success(
            format!("application '{app}' exists"),
            cmd(config, &["kubectl", "-n", ns, "get", "applications.argoproj.io", app]),
        )?);

        group.push(TestCase::expect_success(
            format!("application '{app}' is Synced"),
            Eventually::new(
                script(
                    config,
                    r#"test "$(kubectl -n "$1" get applications.argoproj.io "$2" -o jsonpath='{.status.sync.status}')" = Synced"#,
                    &[ns, app],
                ),
                config.sync_timeout,
            ),
        )?);
    }

    Ok(group)
}

fn security(config: &ChecksConfig) -> Result<TestGroup> {
    let ns = config.argocd_namespace.as_str();

    Ok(TestGroup::new(GROUP_SECURITY)
        .with_case(TestCase::expect_success(
            "initial admin secret exists",
            cmd(
                config,
                &["kubectl", "-n", ns, "get", "secret", "argocd-initial-admin-secret"],
            ),
        )?)
        .with_case(TestCase::expect_failure(
            "anonymous user cannot read secrets",
            cmd(
                config,
                &["kubectl", "--as=system:anonymous", "-n", ns, "get", "secrets"],
            ),
        )?)
        .with_case(TestCase::expect_failure(
            "default service account cannot delete namespaces",
            script(
                config,
                r#"kubectl auth can-i delete namespaces --as="system:serviceaccount:$1:default" | grep -qx yes"#,
                &[ns],
            ),
        )?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::case::Expectation;

    fn labels(registry: &Registry) -> Vec<&str> {
        registry.groups().iter().map(TestGroup::label).collect()
    }

    #[test]
    fn test_group_order() {
        let registry = default_registry(&ChecksConfig::default()).unwrap();
        assert_eq!(
            labels(&registry),
            vec![
                GROUP_TOOLING,
                GROUP_CONNECTIVITY,
                GROUP_INSTALLATION,
                GROUP_APPLICATIONS,
                GROUP_SECURITY
            ]
        );
    }

    #[test]
    fn test_applications_add_two_cases_each() {
        let without = default_registry(&ChecksConfig::default()).unwrap();
        let with = default_registry(&ChecksConfig {
            applications: vec!["guestbook".to_string(), "nginx".to_string()],
            ..ChecksConfig::default()
        })
        .unwrap();

        assert_eq!(with.case_count(), without.case_count() + 4);

        let apps = &with.groups()[3];
        assert_eq!(apps.label(), GROUP_APPLICATIONS);
        assert_eq!(apps.cases()[2].name(), "application 'guestbook' is Synced");
        assert!(apps.cases()[2]
            .predicate()
            .describe()
            .starts_with("eventually("));
    }

    #[test]
    fn test_security_uses_expect_failure() {
        let registry = default_registry(&ChecksConfig::default()).unwrap();
        let security = &registry.groups()[4];
        let expect_failure = security
            .cases()
            .iter()
            .filter(|c| c.expected() == Expectation::Failure)
            .count();
        assert_eq!(expect_failure, 2);
    }

    #[test]
    fn test_commands_follow_config() {
        let registry = default_registry(&ChecksConfig {
            cluster_name: "gitops".to_string(),
            argocd_namespace: "cd".to_string(),
            ..ChecksConfig::default()
        })
        .unwrap();

        let connectivity = &registry.groups()[1];
        assert_eq!(connectivity.cases()[0].name(), "kind cluster 'gitops' exists");
        assert_eq!(
            connectivity.cases()[1].predicate().describe(),
            "kubectl cluster-info --context kind-gitops"
        );

        assert_eq!(
            connectivity.cases()[0].predicate().describe(),
            r#"sh -c kind get clusters | grep -qxF -- "$1" sh gitops"#
        );

        let installation = &registry.groups()[2];
        assert_eq!(
            installation.cases()[0].predicate().describe(),
            "kubectl get namespace cd"
        );
    }

    #[test]
    fn test_names_with_quotes_stay_out_of_scripts() {
        let registry = default_registry(&ChecksConfig {
            cluster_name: "x' || true; echo '".to_string(),
            argocd_namespace: "cd; rm -rf /".to_string(),
            applications: vec!["app$(id)".to_string()],
            ..ChecksConfig::default()
        })
        .unwrap();

        for group in registry.groups() {
            for case in group.cases() {
                let described = case.predicate().describe();
                if let Some(body) = described.strip_prefix("sh -c ") {
                    let script_text = body.split(" sh ").next().unwrap();
                    assert!(!script_text.contains("rm -rf"), "{described}");
                    assert!(!script_text.contains("|| true"), "{described}");
                    assert!(!script_text.contains("app$(id)"), "{described}");
                }
            }
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_script_arguments_are_not_evaluated() {
        use crate::case::Outcome;
        use crate::predicate::Predicate;

        let config = ChecksConfig::default();
        let hostile = script(&config, r#"test "$1" = x"#, &["x; exit 0"]);
        assert_eq!(hostile.check().await.unwrap(), Outcome::Failure);

        let exact = script(&config, r#"test "$1" = x"#, &["x"]);
        assert_eq!(exact.check().await.unwrap(), Outcome::Success);

        let regex_chars = script(&config, r#"printf 'abc\n' | grep -qxF -- "$1""#, &["a.c"]);
        assert_eq!(regex_chars.check().await.unwrap(), Outcome::Failure);
    }
}

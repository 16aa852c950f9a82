use k8s_openapi::api::core::v1::PodSpec;

/// Produce a copy of the given spec with container environment variables
/// removed unless the requesting role may see them.
///
/// Environment variables commonly carry secrets, so they are stripped for any
/// role without an explicit env var grant. The input spec is never mutated;
/// concurrent evaluation tasks may be reading the same underlying record.
pub fn redact_env(spec: &PodSpec, allow_env_vars: bool) -> PodSpec {
    let mut redacted = spec.clone();
    if !allow_env_vars {
        for container in redacted.containers.iter_mut() {
            container.env = None;
        }
    }
    redacted
}

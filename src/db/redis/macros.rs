/// Read-through caching.
///
/// Returns the cached value for `$key` when present. Otherwise awaits `$block`,
/// queues the result for a background write with `$ttl` seconds to live and
/// returns it. A failing cache read is logged and treated as a miss; errors
/// from `$block` are propagated with `?`.
///
/// # Example
/// ```rust,ignore
/// let courses: Vec<CourseSummary> = cached!(cache, key, 300, async move {
///     provider.get_recommendations(&ctx).await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        match $cache.get_from_cache(&$key).await {
            Ok(Some(hit)) => {
                tracing::debug!(key = %$key, "Cache hit");
                Ok(hit)
            }
            outcome => {
                if let Err(e) = outcome {
                    tracing::warn!(key = %$key, error = %e, "Cache read failed, treating as miss");
                }
                let value = $block.await?;
                $cache.set_in_background(&$key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}

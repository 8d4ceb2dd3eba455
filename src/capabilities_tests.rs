//! Unit tests for the declared parameter space

#[cfg(test)]
mod tests {
    use crate::capabilities::{Access, Capabilities};
    use crate::error::Error;
    use crate::format::SampleFormat;
    use crate::host::HwParams;
    use crate::test_util::stereo_params;

    fn capabilities() -> Capabilities {
        Capabilities::new(SampleFormat::DEFAULTS.to_vec())
    }

    #[test]
    fn test_accepts_parameters_in_range() {
        let capabilities = capabilities();

        assert!(capabilities.check(&stereo_params(4096, 1024)).is_ok());
        assert_eq!(
            capabilities.access,
            [Access::RwInterleaved, Access::MmapInterleaved]
        );
    }

    #[test]
    fn test_huge_buffer_is_rejected_without_overflow() {
        let params = HwParams {
            buffer_size: u64::MAX / 2,
            ..stereo_params(4096, 1024)
        };

        let result = capabilities().check(&params);

        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_huge_period_is_rejected_without_overflow() {
        let params = stereo_params(4096, u64::MAX);

        let result = capabilities().check(&params);

        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_disabled_format_is_rejected() {
        let capabilities = Capabilities::new(vec![SampleFormat::FloatLe]);

        let result = capabilities.check(&stereo_params(4096, 1024));

        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }
}

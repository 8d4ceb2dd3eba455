//! Unit tests for the drain timer

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::test_util::is_readable;
    use crate::timer::Timer;
    use std::time::Duration;

    const PERIOD: Duration = Duration::from_millis(100);

    #[test]
    fn test_expiry_is_acknowledged() {
        let mut timer = Timer::create().unwrap();
        let fd = timer.fd().unwrap();

        timer.arm(PERIOD).unwrap();
        assert!(timer.is_armed());

        // One expiry in, well before the next
        std::thread::sleep(Duration::from_millis(130));
        assert!(is_readable(fd));

        assert!(timer.acknowledge().unwrap() >= 1);
        assert!(!is_readable(fd));
    }

    #[test]
    fn test_acknowledge_without_expiry_is_zero() {
        let mut timer = Timer::create().unwrap();

        assert_eq!(timer.acknowledge().unwrap(), 0);
    }

    #[test]
    fn test_disarmed_timer_stays_quiet() {
        let mut timer = Timer::create().unwrap();
        let fd = timer.fd().unwrap();

        timer.arm(PERIOD).unwrap();
        timer.disarm().unwrap();
        assert!(!timer.is_armed());

        std::thread::sleep(Duration::from_millis(130));
        assert!(!is_readable(fd));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut timer = Timer::create().unwrap();
        timer.arm(PERIOD).unwrap();

        timer.close();
        timer.close();

        assert_eq!(timer.fd(), None);
        assert!(!timer.is_armed());
        assert!(matches!(timer.arm(PERIOD), Err(Error::BadDescriptor)));
        assert!(matches!(timer.acknowledge(), Err(Error::BadDescriptor)));
    }
}

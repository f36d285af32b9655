/// receives exactly one report per attempt that actually ran the operation,
/// in attempt order and synchronously with the attempt finishing
/// nothing is reported when the loop stops on cancellation
pub trait ProgressObserver: Send + Sync {
    fn report(&self, success: bool);
}

impl<F> ProgressObserver for F
where
    F: Fn(bool) + Send + Sync,
{
    fn report(&self, success: bool) {
        self(success);
    }
}

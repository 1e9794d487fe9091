//! End-to-end tests running the real HTTP adapters against in-process fakes of
//! the Docker Engine API and the collector.


#[cfg(test)]
mod adapters {
    mod integration;
}

#[cfg(test)]
mod coordinator {
    mod integration;
}

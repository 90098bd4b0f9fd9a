use std::thread;
use std::time::{Duration, Instant};

use delay_heap::{Delay, DelayQueue};

fn main() {
    env_logger::init();

    let queue: DelayQueue<Delay<&str>> = DelayQueue::new();

    // Clone the queue and move it to the consumer thread
    let consumer_queue = queue.clone();
    let consumer_handle = thread::spawn(move || {
        // The take() will block until an item is available and its delay has expired
        println!("First take: {}", consumer_queue.take().value); // Prints "First take: now"
        println!("Second take: {}", consumer_queue.take().value); // Prints "Second take: 3s"
    });

    // Clone the queue and move it to the producer thread
    let producer_queue = queue.clone();
    let producer_handle = thread::spawn(move || {
        // This item can only be taken after 3 seconds have passed
        producer_queue.put(Delay::for_duration("3s", Duration::from_secs(3)));

        // This item can be taken immediately
        producer_queue.put(Delay::until_instant("now", Instant::now()));
    });

    consumer_handle.join().unwrap();
    producer_handle.join().unwrap();

    assert!(queue.is_empty());
}

mod integration {
    mod cancellation_tests;
    mod plan_tests;
    mod scan_tests;
}
